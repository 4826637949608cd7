use serde::{Deserialize, Serialize};

use kosmos_auth::{Caller, ModulePermissionSet, RoleName};
use kosmos_core::{
    AuditDto, AuditFields, DomainError, ModuleId, RecordId, Validate, Validator, impl_record,
};
use kosmos_module::{
    ErpModule, ModuleCommand, ModuleDefinition, TargetsRecord, exact_matches, patch,
    patch_opt_text, patch_text,
};

/// Tax rates are stored in basis points (825 = 8.25%).
pub const MAX_TAX_RATE_BPS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: RecordId,
    pub customer_name: String,
    pub customer_description: Option<String>,
    pub phone: String,
    pub fax: Option<String>,
    pub general_email: Option<String>,
    pub website: Option<String>,
    pub category: String,
    pub is_taxable: bool,
    pub tax_rate: u32,
    pub audit: AuditFields,
}

impl_record!(Customer);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCustomer {
    pub caller: Caller,
    pub customer_name: String,
    pub customer_description: Option<String>,
    pub phone: String,
    pub fax: Option<String>,
    pub general_email: Option<String>,
    pub website: Option<String>,
    pub category: String,
    pub is_taxable: bool,
    pub tax_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCustomer {
    pub caller: Caller,
    pub id: RecordId,
    pub customer_name: Option<String>,
    pub customer_description: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub general_email: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub is_taxable: Option<bool>,
    pub tax_rate: Option<u32>,
}

impl EditCustomer {
    pub fn new(caller: Caller, id: RecordId) -> Self {
        Self {
            caller,
            id,
            customer_name: None,
            customer_description: None,
            phone: None,
            fax: None,
            general_email: None,
            website: None,
            category: None,
            is_taxable: None,
            tax_rate: None,
        }
    }
}

impl ModuleCommand for CreateCustomer {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditCustomer {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditCustomer {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

impl Validate for CreateCustomer {
    fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .required("customer_name", &self.customer_name)
            .max_len("customer_name", Some(&self.customer_name), 255)
            .required("phone", &self.phone)
            .max_len("phone", Some(&self.phone), 50)
            .max_len("fax", self.fax.as_deref(), 50)
            .max_len("general_email", self.general_email.as_deref(), 255)
            .max_len("website", self.website.as_deref(), 255)
            .max_len("category", Some(&self.category), 100)
            .check(self.tax_rate <= MAX_TAX_RATE_BPS, "tax_rate must not exceed 100%")
            .finish()
    }
}

impl Validate for EditCustomer {
    fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .check(self.id.get() > 0, "id must be greater than zero")
            .max_len("customer_name", self.customer_name.as_deref(), 255)
            .max_len("phone", self.phone.as_deref(), 50)
            .max_len("fax", self.fax.as_deref(), 50)
            .max_len("general_email", self.general_email.as_deref(), 255)
            .max_len("website", self.website.as_deref(), 255)
            .max_len("category", self.category.as_deref(), 100)
            .check(
                self.tax_rate.is_none_or(|r| r <= MAX_TAX_RATE_BPS),
                "tax_rate must not exceed 100%",
            )
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerFilter {
    pub category: Option<String>,
    pub is_taxable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDto {
    pub customer_name: String,
    pub customer_description: Option<String>,
    pub phone: String,
    pub fax: Option<String>,
    pub general_email: Option<String>,
    pub website: Option<String>,
    pub category: String,
    pub is_taxable: bool,
    pub tax_rate: u32,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerListDto {
    pub customer_name: String,
    pub phone: String,
    pub category: String,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub struct Customers;

impl ModuleDefinition for Customers {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0x5f1b6b1e_2f0a_4d0e_9a43_3c8f4e0d7a11);
    const MODULE_NAME: &'static str = "Customers";
    const RECORD_NAME: &'static str = "Customer";

    type Record = Customer;
    type Dto = CustomerDto;
    type ListDto = CustomerListDto;
    type Create = CreateCustomer;
    type Edit = EditCustomer;
    type Filter = CustomerFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("Customer Users"),
            "customer",
            "Customer",
        )
    }

    fn create_record(cmd: &CreateCustomer, audit: AuditFields) -> Customer {
        Customer {
            id: RecordId::new(0),
            customer_name: cmd.customer_name.clone(),
            customer_description: cmd.customer_description.clone(),
            phone: cmd.phone.clone(),
            fax: cmd.fax.clone(),
            general_email: cmd.general_email.clone(),
            website: cmd.website.clone(),
            category: cmd.category.clone(),
            is_taxable: cmd.is_taxable,
            tax_rate: cmd.tax_rate,
            audit,
        }
    }

    fn apply_edit(customer: &mut Customer, cmd: &EditCustomer) -> Result<(), DomainError> {
        patch_text(&mut customer.customer_name, cmd.customer_name.as_deref());
        patch_opt_text(&mut customer.customer_description, cmd.customer_description.as_deref());
        patch_text(&mut customer.phone, cmd.phone.as_deref());
        patch_opt_text(&mut customer.fax, cmd.fax.as_deref());
        patch_opt_text(&mut customer.general_email, cmd.general_email.as_deref());
        patch_opt_text(&mut customer.website, cmd.website.as_deref());
        patch_text(&mut customer.category, cmd.category.as_deref());
        patch(&mut customer.is_taxable, cmd.is_taxable.as_ref());
        patch(&mut customer.tax_rate, cmd.tax_rate.as_ref());
        Ok(())
    }

    fn to_dto(customer: &Customer) -> CustomerDto {
        CustomerDto {
            customer_name: customer.customer_name.clone(),
            customer_description: customer.customer_description.clone(),
            phone: customer.phone.clone(),
            fax: customer.fax.clone(),
            general_email: customer.general_email.clone(),
            website: customer.website.clone(),
            category: customer.category.clone(),
            is_taxable: customer.is_taxable,
            tax_rate: customer.tax_rate,
            audit: AuditDto::new(customer.id, &customer.audit),
        }
    }

    fn to_list_dto(customer: &Customer) -> CustomerListDto {
        CustomerListDto {
            customer_name: customer.customer_name.clone(),
            phone: customer.phone.clone(),
            category: customer.category.clone(),
            audit: AuditDto::new(customer.id, &customer.audit),
        }
    }

    fn search_fields(customer: &Customer) -> Vec<&str> {
        let mut fields = vec![
            customer.customer_name.as_str(),
            customer.phone.as_str(),
            customer.category.as_str(),
        ];
        fields.extend(
            [&customer.customer_description, &customer.fax, &customer.general_email, &customer.website]
                .into_iter()
                .filter_map(|f| f.as_deref()),
        );
        fields
    }

    fn matches(customer: &Customer, filter: &CustomerFilter) -> bool {
        exact_matches(filter.category.as_ref(), &customer.category)
            && exact_matches(filter.is_taxable.as_ref(), &customer.is_taxable)
    }
}

pub type CustomerModule<S> = ErpModule<Customers, S>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use kosmos_core::{PagingSortingParameters, ResultCode};
    use kosmos_module::{FindCommand, InMemoryRecordStore};

    use crate::test_support::{AllowAll, caller};

    fn module() -> CustomerModule<InMemoryRecordStore<Customer>> {
        ErpModule::new(InMemoryRecordStore::new("Customer"), Arc::new(AllowAll))
    }

    fn create(name: &str, category: &str, is_taxable: bool) -> CreateCustomer {
        CreateCustomer {
            caller: caller(1),
            customer_name: name.to_string(),
            customer_description: None,
            phone: "555-0100".to_string(),
            fax: None,
            general_email: Some(format!("ap@{}.example", name.to_lowercase())),
            website: None,
            category: category.to_string(),
            is_taxable,
            tax_rate: 825,
        }
    }

    #[test]
    fn phone_and_name_are_required() {
        let module = module();
        let mut cmd = create("Initech", "Retail", true);
        cmd.phone.clear();
        cmd.customer_name.clear();
        let resp = module.create(&cmd);
        assert_eq!(resp.result_code, ResultCode::DataValidationError);
        assert!(resp.exception.unwrap().contains("phone is required"));
    }

    #[test]
    fn tax_rate_is_bounded() {
        let module = module();
        let mut cmd = create("Initech", "Retail", true);
        cmd.tax_rate = 10_001;
        assert_eq!(module.create(&cmd).result_code, ResultCode::DataValidationError);
    }

    #[test]
    fn find_by_category_and_email_wildcard() {
        let module = module();
        module.create(&create("Initech", "Retail", true)).into_result().unwrap();
        module.create(&create("Umbrella", "Wholesale", false)).into_result().unwrap();
        module.create(&create("Hooli", "Retail", false)).into_result().unwrap();

        let retail_exempt = module.find(
            PagingSortingParameters::default(),
            &FindCommand::new(caller(1)).with_filter(CustomerFilter {
                category: Some("Retail".into()),
                is_taxable: Some(false),
            }),
        );
        assert_eq!(retail_exempt.total_result_count, 1);
        assert_eq!(retail_exempt.data[0].customer_name, "Hooli");

        let by_mail = module.find(
            PagingSortingParameters::default(),
            &FindCommand::new(caller(1)).with_wildcard("umbrella.example"),
        );
        assert_eq!(by_mail.total_result_count, 1);
    }

    #[test]
    fn edit_toggles_taxable() {
        let module = module();
        module.create(&create("Initech", "Retail", true)).into_result().unwrap();

        let mut edit = EditCustomer::new(caller(1), RecordId::new(1));
        edit.is_taxable = Some(false);
        let dto = module.edit(&edit).into_result().unwrap();
        assert!(!dto.is_taxable);
        assert_eq!(dto.tax_rate, 825);
    }
}
