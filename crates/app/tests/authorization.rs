mod common;

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;

use kosmos_auth::{
    Caller, Capability, PermissionKey, RoleName, assign_role, grant_permission, revoke_role,
    set_permission_active,
};
use kosmos_core::{PagingSortingParameters, RecordId, ResultCode, UserId};
use kosmos_geography::{CreateCountry, CreateState, Countries, States};
use kosmos_module::{DeleteCommand, FindCommand, ModuleDefinition};
use kosmos_parties::{Customers, EditCustomer};
use kosmos_sales::{CreateOrder, NewOrderLine};

use common::{SECRET, acme, boot, caller, mint_jwt};

const ADMIN: UserId = UserId::new(1);

fn customer_users() -> RoleName {
    RoleName::from_static("Customer Users")
}

#[test]
fn a_user_without_roles_is_denied_everything() {
    let boot = boot();
    let services = &boot.services;
    let nobody = caller(5);

    assert_eq!(services.customers.create(&acme(nobody.clone())).result_code, ResultCode::InvalidPermission);
    assert_eq!(
        services.customers.get_dto(&nobody, RecordId::new(1)).result_code,
        ResultCode::InvalidPermission
    );
    assert_eq!(
        services
            .customers
            .find(PagingSortingParameters::default(), &FindCommand::new(nobody.clone()))
            .result_code,
        ResultCode::InvalidPermission
    );
    assert!(services.checker.effective_capabilities(UserId::new(5)).unwrap().is_empty());
}

#[test]
fn role_membership_unlocks_the_module() {
    let boot = boot();
    let services = &boot.services;
    let clerk = caller(5);
    assign_role(&*services.repository, UserId::new(5), &customer_users(), ADMIN, Utc::now()).unwrap();

    let created = services.customers.create(&acme(clerk.clone())).into_result().unwrap();
    assert_eq!(created.audit.created_by, UserId::new(5));

    let mut edit = EditCustomer {
        caller: clerk.clone(),
        id: created.audit.id,
        customer_name: Some("Acme Holdings".into()),
        customer_description: None,
        phone: None,
        fax: None,
        general_email: None,
        website: None,
        category: None,
        is_taxable: None,
        tax_rate: None,
    };
    let edited = services.customers.edit(&edit).into_result().unwrap();
    assert_eq!(edited.customer_name, "Acme Holdings");
    assert_eq!(edited.phone, "555-0100");

    let page = services
        .customers
        .find(PagingSortingParameters::default(), &FindCommand::new(clerk.clone()).with_wildcard("holdings"));
    assert_eq!(page.total_result_count, 1);

    let deleted = services
        .customers
        .delete(&DeleteCommand::new(clerk.clone(), created.audit.id))
        .into_result()
        .unwrap();
    assert!(deleted.audit.is_deleted);
    let page = services
        .customers
        .find(PagingSortingParameters::default(), &FindCommand::new(clerk.clone()));
    assert_eq!(page.total_result_count, 0);

    // The role covers customers only.
    let order = CreateOrder::new(clerk.clone(), created.audit.id, date(2024, 3, 1))
        .with_line(NewOrderLine::new(RecordId::new(1), 1, 100));
    assert_eq!(services.orders.create(&order).result_code, ResultCode::InvalidPermission);

    revoke_role(&*services.repository, UserId::new(5), &customer_users(), ADMIN, Utc::now()).unwrap();
    edit.customer_name = Some("Acme Again".into());
    assert_eq!(services.customers.edit(&edit).result_code, ResultCode::InvalidPermission);
}

#[test]
fn tokens_must_verify_and_belong_to_the_caller() {
    let boot = boot();
    let services = &boot.services;
    assign_role(&*services.repository, UserId::new(5), &customer_users(), ADMIN, Utc::now()).unwrap();

    let borrowed = Caller::new(UserId::new(5), mint_jwt(SECRET, UserId::new(6)));
    assert_eq!(services.customers.create(&acme(borrowed)).result_code, ResultCode::InvalidPermission);

    let forged = Caller::new(UserId::new(5), mint_jwt("some-other-secret", UserId::new(5)));
    assert_eq!(services.customers.create(&acme(forged)).result_code, ResultCode::InvalidPermission);

    let garbage = Caller::new(UserId::new(5), "not-a-jwt");
    assert_eq!(services.customers.create(&acme(garbage)).result_code, ResultCode::InvalidPermission);

    let bearer = Caller::new(UserId::new(5), format!("Bearer {}", mint_jwt(SECRET, UserId::new(5))));
    assert!(services.customers.create(&acme(bearer)).success);
}

#[test]
fn a_deactivated_permission_grants_nothing() {
    let boot = boot();
    let services = &boot.services;
    let clerk = caller(5);
    assign_role(&*services.repository, UserId::new(5), &customer_users(), ADMIN, Utc::now()).unwrap();

    set_permission_active(
        &*services.repository,
        Customers::MODULE_ID,
        &PermissionKey::from_static("customer_create"),
        false,
        ADMIN,
        Utc::now(),
    )
    .unwrap();

    assert_eq!(services.customers.create(&acme(clerk.clone())).result_code, ResultCode::InvalidPermission);
    // Reading is a separate row and stays granted.
    assert_eq!(
        services.customers.get_dto(&clerk, RecordId::new(1)).result_code,
        ResultCode::NotFound
    );
}

#[test]
fn granting_one_flag_does_not_imply_the_others() {
    let boot = boot();
    let services = &boot.services;
    let auditors = RoleName::from_static("Country Users");
    // Only the edit permission of Customers is added to the Country role.
    grant_permission(
        &*services.repository,
        Customers::MODULE_ID,
        &PermissionKey::from_static("customer_edit"),
        &auditors,
        ADMIN,
        Utc::now(),
    )
    .unwrap();
    assign_role(&*services.repository, UserId::new(7), &auditors, ADMIN, Utc::now()).unwrap();

    let effective = services.checker.effective_capabilities(UserId::new(7)).unwrap();
    let customer = effective[&PermissionKey::from_static("customer_edit")];
    assert!(customer.contains(Capability::Edit));
    assert!(!customer.contains(Capability::Read));
    assert!(!effective.contains_key(&PermissionKey::from_static("customer_read")));

    let auditor = caller(7);
    assert_eq!(services.customers.create(&acme(auditor.clone())).result_code, ResultCode::InvalidPermission);
    assert_eq!(
        services.customers.get_dto(&auditor, RecordId::new(1)).result_code,
        ResultCode::InvalidPermission
    );
}

#[test]
fn roles_union_across_memberships() {
    let boot = boot();
    let services = &boot.services;
    let user = UserId::new(8);
    for role in ["Country Users", "State Users"] {
        assign_role(&*services.repository, user, &RoleName::from_static(role), ADMIN, Utc::now()).unwrap();
    }

    let geo = caller(8);
    let canada = services
        .countries
        .create(&CreateCountry::new(geo.clone(), "Canada", "CA", "CAN"))
        .into_result()
        .unwrap();
    let ontario = services.states.create(&CreateState {
        caller: geo.clone(),
        country_id: canada.audit.id,
        state_name: "Ontario".into(),
        iso2: "ON".into(),
    });
    assert!(ontario.success);

    let effective = services.checker.effective_capabilities(user).unwrap();
    assert_eq!(effective.len(), Countries::permissions().permissions.len() + States::permissions().permissions.len());
}

#[test]
fn states_are_readable_without_any_role() {
    let boot = boot();
    let services = &boot.services;
    assign_role(&*services.repository, UserId::new(8), &RoleName::from_static("State Users"), ADMIN, Utc::now())
        .unwrap();
    let created = services
        .states
        .create(&CreateState {
            caller: caller(8),
            country_id: RecordId::new(1),
            state_name: "Texas".into(),
            iso2: "tx".into(),
        })
        .into_result()
        .unwrap();

    let read = services.states.get_dto(&caller(9), created.audit.id).into_result().unwrap();
    assert_eq!(read.iso2, "TX");
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Only the customer role opens the customer module, whatever else the
    /// user holds.
    #[test]
    fn customer_access_follows_the_customer_role(
        with_customer_role in any::<bool>(),
        others in proptest::sample::subsequence(
            vec!["CRM Users", "Vendor Users", "Sales Users", "Product Users", "State Users"],
            0..=5,
        ),
    ) {
        let boot = boot();
        let services = &boot.services;
        let user = UserId::new(11);
        for role in others {
            assign_role(&*services.repository, user, &RoleName::from_static(role), ADMIN, Utc::now()).unwrap();
        }
        if with_customer_role {
            assign_role(&*services.repository, user, &customer_users(), ADMIN, Utc::now()).unwrap();
        }

        let resp = services.customers.create(&acme(caller(11)));
        prop_assert_eq!(resp.success, with_customer_role);
        if !with_customer_role {
            prop_assert_eq!(resp.result_code, ResultCode::InvalidPermission);
        }
    }
}
