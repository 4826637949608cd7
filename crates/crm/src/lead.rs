use core::str::FromStr;

use serde::{Deserialize, Serialize};

use kosmos_auth::{Caller, ModulePermissionSet, RoleName};
use kosmos_core::{
    AuditDto, AuditFields, DomainError, ModuleId, RecordId, UserId, Validate, Validator, impl_record,
};
use kosmos_module::{
    ErpModule, ModuleCommand, ModuleDefinition, TargetsRecord, exact_matches, patch, patch_opt,
    patch_opt_text, patch_text,
};

/// Sales pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LeadStage {
    #[default]
    New,
    Contacted,
    Qualified,
    Unqualified,
    Working,
    Reopen,
    Lost,
}

impl LeadStage {
    pub const ALL: [LeadStage; 7] = [
        LeadStage::New,
        LeadStage::Contacted,
        LeadStage::Qualified,
        LeadStage::Unqualified,
        LeadStage::Working,
        LeadStage::Reopen,
        LeadStage::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStage::New => "New",
            LeadStage::Contacted => "Contacted",
            LeadStage::Qualified => "Qualified",
            LeadStage::Unqualified => "Unqualified",
            LeadStage::Working => "Working",
            LeadStage::Reopen => "Reopen",
            LeadStage::Lost => "Lost",
        }
    }
}

impl core::fmt::Display for LeadStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LeadStage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown lead stage '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cell_phone: Option<String>,
    pub company_name: String,
    pub lead_stage: LeadStage,
    pub time_zone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub is_converted: bool,
    pub converted_customer_id: Option<RecordId>,
    pub converted_contact_id: Option<RecordId>,
    pub owner_id: UserId,
    pub audit: AuditFields,
}

impl_record!(Lead);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLead {
    pub caller: Caller,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cell_phone: Option<String>,
    pub company_name: String,
    /// Defaults to `New`.
    pub lead_stage: Option<LeadStage>,
    pub time_zone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub owner_id: UserId,
}

impl CreateLead {
    pub fn new(
        caller: Caller,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        company_name: impl Into<String>,
        owner_id: UserId,
    ) -> Self {
        Self {
            caller,
            first_name: first_name.into(),
            last_name: last_name.into(),
            title: None,
            email: None,
            phone: None,
            cell_phone: None,
            company_name: company_name.into(),
            lead_stage: None,
            time_zone: None,
            address_line1: None,
            address_line2: None,
            city: None,
            state: None,
            zip: None,
            country: None,
            owner_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeadChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cell_phone: Option<String>,
    pub company_name: Option<String>,
    pub lead_stage: Option<LeadStage>,
    pub time_zone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub is_converted: Option<bool>,
    pub converted_customer_id: Option<RecordId>,
    pub converted_contact_id: Option<RecordId>,
    pub owner_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLead {
    pub caller: Caller,
    pub id: RecordId,
    #[serde(flatten)]
    pub changes: LeadChanges,
}

impl ModuleCommand for CreateLead {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditLead {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditLead {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

fn check_email(v: &mut Validator, email: Option<&str>) {
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        v.check(email.contains('@'), "email must be a valid address");
    }
}

impl Validate for CreateLead {
    fn validate(&self) -> Result<(), DomainError> {
        let mut v = Validator::new();
        v.required("first_name", &self.first_name)
            .required("last_name", &self.last_name)
            .required("company_name", &self.company_name)
            .max_len("first_name", Some(&self.first_name), 100)
            .max_len("last_name", Some(&self.last_name), 100)
            .max_len("company_name", Some(&self.company_name), 255)
            .max_len("email", self.email.as_deref(), 255)
            .max_len("zip", self.zip.as_deref(), 20);
        check_email(&mut v, self.email.as_deref());
        v.finish()
    }
}

impl Validate for EditLead {
    fn validate(&self) -> Result<(), DomainError> {
        let c = &self.changes;
        let mut v = Validator::new();
        v.check(self.id.get() > 0, "id must be greater than zero")
            .max_len("first_name", c.first_name.as_deref(), 100)
            .max_len("last_name", c.last_name.as_deref(), 100)
            .max_len("company_name", c.company_name.as_deref(), 255)
            .max_len("email", c.email.as_deref(), 255)
            .max_len("zip", c.zip.as_deref(), 20);
        check_email(&mut v, c.email.as_deref());
        v.finish()
    }
}

/// Exact-match filters for `find`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeadFilter {
    pub lead_stage: Option<LeadStage>,
    pub owner_id: Option<UserId>,
    pub is_converted: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDto {
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cell_phone: Option<String>,
    pub company_name: String,
    pub lead_stage: LeadStage,
    pub time_zone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub is_converted: bool,
    pub converted_customer_id: Option<RecordId>,
    pub converted_contact_id: Option<RecordId>,
    pub owner_id: UserId,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadListDto {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub company_name: String,
    pub lead_stage: LeadStage,
    pub is_converted: bool,
    pub owner_id: UserId,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub struct Leads;

impl ModuleDefinition for Leads {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0x9d624ee2_6433_49f0_bc6c_3e6978e2ac9c);
    const MODULE_NAME: &'static str = "Leads";
    const RECORD_NAME: &'static str = "Lead";

    type Record = Lead;
    type Dto = LeadDto;
    type ListDto = LeadListDto;
    type Create = CreateLead;
    type Edit = EditLead;
    type Filter = LeadFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("CRM Users"),
            "lead",
            "Lead",
        )
    }

    fn create_record(cmd: &CreateLead, audit: AuditFields) -> Lead {
        Lead {
            id: RecordId::new(0),
            first_name: cmd.first_name.clone(),
            last_name: cmd.last_name.clone(),
            title: cmd.title.clone(),
            email: cmd.email.clone(),
            phone: cmd.phone.clone(),
            cell_phone: cmd.cell_phone.clone(),
            company_name: cmd.company_name.clone(),
            lead_stage: cmd.lead_stage.unwrap_or_default(),
            time_zone: cmd.time_zone.clone(),
            address_line1: cmd.address_line1.clone(),
            address_line2: cmd.address_line2.clone(),
            city: cmd.city.clone(),
            state: cmd.state.clone(),
            zip: cmd.zip.clone(),
            country: cmd.country.clone(),
            is_converted: false,
            converted_customer_id: None,
            converted_contact_id: None,
            owner_id: cmd.owner_id,
            audit,
        }
    }

    fn apply_edit(lead: &mut Lead, cmd: &EditLead) -> Result<(), DomainError> {
        let c = &cmd.changes;
        patch_text(&mut lead.first_name, c.first_name.as_deref());
        patch_text(&mut lead.last_name, c.last_name.as_deref());
        patch_opt_text(&mut lead.title, c.title.as_deref());
        patch_opt_text(&mut lead.email, c.email.as_deref());
        patch_opt_text(&mut lead.phone, c.phone.as_deref());
        patch_opt_text(&mut lead.cell_phone, c.cell_phone.as_deref());
        patch_text(&mut lead.company_name, c.company_name.as_deref());
        patch(&mut lead.lead_stage, c.lead_stage.as_ref());
        patch_opt_text(&mut lead.time_zone, c.time_zone.as_deref());
        patch_opt_text(&mut lead.address_line1, c.address_line1.as_deref());
        patch_opt_text(&mut lead.address_line2, c.address_line2.as_deref());
        patch_opt_text(&mut lead.city, c.city.as_deref());
        patch_opt_text(&mut lead.state, c.state.as_deref());
        patch_opt_text(&mut lead.zip, c.zip.as_deref());
        patch_opt_text(&mut lead.country, c.country.as_deref());
        patch(&mut lead.is_converted, c.is_converted.as_ref());
        patch_opt(&mut lead.converted_customer_id, c.converted_customer_id.as_ref());
        patch_opt(&mut lead.converted_contact_id, c.converted_contact_id.as_ref());
        patch(&mut lead.owner_id, c.owner_id.as_ref());
        Ok(())
    }

    fn to_dto(lead: &Lead) -> LeadDto {
        LeadDto {
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            title: lead.title.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            cell_phone: lead.cell_phone.clone(),
            company_name: lead.company_name.clone(),
            lead_stage: lead.lead_stage,
            time_zone: lead.time_zone.clone(),
            address_line1: lead.address_line1.clone(),
            address_line2: lead.address_line2.clone(),
            city: lead.city.clone(),
            state: lead.state.clone(),
            zip: lead.zip.clone(),
            country: lead.country.clone(),
            is_converted: lead.is_converted,
            converted_customer_id: lead.converted_customer_id,
            converted_contact_id: lead.converted_contact_id,
            owner_id: lead.owner_id,
            audit: AuditDto::new(lead.id, &lead.audit),
        }
    }

    fn to_list_dto(lead: &Lead) -> LeadListDto {
        LeadListDto {
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            email: lead.email.clone(),
            company_name: lead.company_name.clone(),
            lead_stage: lead.lead_stage,
            is_converted: lead.is_converted,
            owner_id: lead.owner_id,
            audit: AuditDto::new(lead.id, &lead.audit),
        }
    }

    fn search_fields(lead: &Lead) -> Vec<&str> {
        let mut fields = vec![
            lead.first_name.as_str(),
            lead.last_name.as_str(),
            lead.company_name.as_str(),
        ];
        fields.extend(lead.email.as_deref());
        fields
    }

    fn matches(lead: &Lead, filter: &LeadFilter) -> bool {
        exact_matches(filter.lead_stage.as_ref(), &lead.lead_stage)
            && exact_matches(filter.owner_id.as_ref(), &lead.owner_id)
            && exact_matches(filter.is_converted.as_ref(), &lead.is_converted)
    }
}

pub type LeadModule<S> = ErpModule<Leads, S>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use kosmos_core::{PagingSortingParameters, ResultCode};
    use kosmos_module::{FindCommand, InMemoryRecordStore};

    use crate::test_support::{AllowAll, caller};

    fn module() -> LeadModule<InMemoryRecordStore<Lead>> {
        ErpModule::new(InMemoryRecordStore::new("Lead"), Arc::new(AllowAll))
    }

    fn lead(first: &str, company: &str) -> CreateLead {
        CreateLead::new(caller(1), first, "Smith", company, UserId::new(1))
    }

    #[test]
    fn stage_parsing_is_case_insensitive_and_closed() {
        assert_eq!("qualified".parse::<LeadStage>().unwrap(), LeadStage::Qualified);
        assert_eq!(" Lost ".parse::<LeadStage>().unwrap(), LeadStage::Lost);
        assert!("Won".parse::<LeadStage>().is_err());
        assert_eq!(serde_json::to_value(LeadStage::Reopen).unwrap(), "Reopen");
    }

    #[test]
    fn create_defaults_to_new_stage() {
        let module = module();
        let dto = module.create(&lead("Ada", "Analytical")).into_result().unwrap();
        assert_eq!(dto.lead_stage, LeadStage::New);
        assert!(!dto.is_converted);
        assert_eq!(dto.audit.id, RecordId::new(1));
    }

    #[test]
    fn create_rejects_missing_names_and_bad_email() {
        let module = module();
        let mut cmd = lead("", "");
        cmd.email = Some("nope".into());
        let resp = module.create(&cmd);
        assert_eq!(resp.result_code, ResultCode::DataValidationError);
        let message = resp.exception.unwrap();
        assert!(message.contains("first_name is required"));
        assert!(message.contains("company_name is required"));
        assert!(message.contains("email"));
    }

    #[test]
    fn edit_moves_stage_and_ignores_blank_fields() {
        let module = module();
        module.create(&lead("Ada", "Analytical")).into_result().unwrap();

        let dto = module
            .edit(&EditLead {
                caller: caller(1),
                id: RecordId::new(1),
                changes: LeadChanges {
                    first_name: Some(String::new()),
                    lead_stage: Some(LeadStage::Qualified),
                    ..LeadChanges::default()
                },
            })
            .into_result()
            .unwrap();
        assert_eq!(dto.first_name, "Ada");
        assert_eq!(dto.lead_stage, LeadStage::Qualified);
    }

    #[test]
    fn find_pages_and_filters_by_stage() {
        let module = module();
        for (i, company) in ["Acme", "Acme West", "Globex", "Acme East"].iter().enumerate() {
            let mut cmd = lead(&format!("L{i}"), company);
            if i % 2 == 1 {
                cmd.lead_stage = Some(LeadStage::Working);
            }
            module.create(&cmd).into_result().unwrap();
        }

        let params = PagingSortingParameters {
            result_count: 1,
            ..PagingSortingParameters::default()
        };
        let found = module.find(params, &FindCommand::new(caller(1)).with_wildcard("acme"));
        assert_eq!(found.total_result_count, 3);
        assert_eq!(found.data.len(), 1);
        assert_eq!(found.data[0].company_name, "Acme");

        let working = module.find(
            PagingSortingParameters::default(),
            &FindCommand::new(caller(1)).with_filter(LeadFilter {
                lead_stage: Some(LeadStage::Working),
                ..LeadFilter::default()
            }),
        );
        let companies: Vec<&str> = working.data.iter().map(|l| l.company_name.as_str()).collect();
        assert_eq!(companies, vec!["Acme West", "Acme East"]);
    }

    #[test]
    fn denied_caller_gets_invalid_permission() {
        let module = module();
        let mut cmd = lead("Ada", "Analytical");
        cmd.caller = caller(99);
        assert_eq!(module.create(&cmd).result_code, ResultCode::InvalidPermission);
    }

    #[test]
    fn dto_flattens_audit_fields() {
        let module = module();
        let dto = module.create(&lead("Ada", "Analytical")).into_result().unwrap();
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["lead_stage"], "New");
        assert!(json["created_on_string"].is_string());
    }
}
