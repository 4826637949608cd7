use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kosmos_auth::{Caller, ModulePermissionSet, RoleName};
use kosmos_core::{
    AuditDto, AuditFields, DomainError, ModuleId, RecordId, UserId, Validate, Validator, impl_record,
};
use kosmos_module::{
    ErpModule, ModuleCommand, ModuleDefinition, TargetsRecord, exact_matches, patch, patch_opt,
    patch_text,
};

/// Pipeline stage of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OpportunityStage {
    #[default]
    Prospecting,
    Qualifying,
    Analysis,
    Proposition,
    Proposal,
    Negotiation,
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

impl OpportunityStage {
    pub const ALL: [OpportunityStage; 8] = [
        OpportunityStage::Prospecting,
        OpportunityStage::Qualifying,
        OpportunityStage::Analysis,
        OpportunityStage::Proposition,
        OpportunityStage::Proposal,
        OpportunityStage::Negotiation,
        OpportunityStage::ClosedWon,
        OpportunityStage::ClosedLost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OpportunityStage::Prospecting => "Prospecting",
            OpportunityStage::Qualifying => "Qualifying",
            OpportunityStage::Analysis => "Analysis",
            OpportunityStage::Proposition => "Proposition",
            OpportunityStage::Proposal => "Proposal",
            OpportunityStage::Negotiation => "Negotiation",
            OpportunityStage::ClosedWon => "Closed Won",
            OpportunityStage::ClosedLost => "Closed Lost",
        }
    }

    pub fn is_closed(self) -> bool {
        matches!(self, OpportunityStage::ClosedWon | OpportunityStage::ClosedLost)
    }
}

impl core::fmt::Display for OpportunityStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpportunityStage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        OpportunityStage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown opportunity stage '{s}'")))
    }
}

/// A potential sale. `amount` is in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: RecordId,
    pub opportunity_name: String,
    pub customer_id: Option<RecordId>,
    pub contact_id: Option<RecordId>,
    pub owner_id: UserId,
    pub amount: i64,
    /// Percentage, 0..=100.
    pub win_chance: u8,
    pub expected_close: Option<NaiveDate>,
    pub stage: OpportunityStage,
    pub audit: AuditFields,
}

impl_record!(Opportunity);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOpportunity {
    pub caller: Caller,
    pub opportunity_name: String,
    pub customer_id: Option<RecordId>,
    pub contact_id: Option<RecordId>,
    pub amount: i64,
    pub win_chance: u8,
    pub expected_close: Option<NaiveDate>,
    /// Prospecting when absent.
    pub stage: Option<OpportunityStage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOpportunity {
    pub caller: Caller,
    pub id: RecordId,
    pub opportunity_name: Option<String>,
    pub customer_id: Option<RecordId>,
    pub contact_id: Option<RecordId>,
    pub owner_id: Option<UserId>,
    pub amount: Option<i64>,
    pub win_chance: Option<u8>,
    pub expected_close: Option<NaiveDate>,
    pub stage: Option<OpportunityStage>,
}

impl EditOpportunity {
    pub fn new(caller: Caller, id: RecordId) -> Self {
        Self {
            caller,
            id,
            opportunity_name: None,
            customer_id: None,
            contact_id: None,
            owner_id: None,
            amount: None,
            win_chance: None,
            expected_close: None,
            stage: None,
        }
    }
}

impl ModuleCommand for CreateOpportunity {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditOpportunity {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditOpportunity {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

impl Validate for CreateOpportunity {
    fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .required("opportunity_name", &self.opportunity_name)
            .max_len("opportunity_name", Some(&self.opportunity_name), 255)
            .non_negative("amount", self.amount)
            .check(self.win_chance <= 100, "win_chance must be between 0 and 100")
            .finish()
    }
}

impl Validate for EditOpportunity {
    fn validate(&self) -> Result<(), DomainError> {
        let mut v = Validator::new();
        v.check(self.id.get() > 0, "id must be greater than zero")
            .max_len("opportunity_name", self.opportunity_name.as_deref(), 255)
            .check(
                self.win_chance.is_none_or(|w| w <= 100),
                "win_chance must be between 0 and 100",
            );
        if let Some(amount) = self.amount {
            v.non_negative("amount", amount);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpportunityFilter {
    pub customer_id: Option<RecordId>,
    pub owner_id: Option<UserId>,
    pub stage: Option<OpportunityStage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityDto {
    pub opportunity_name: String,
    pub customer_id: Option<RecordId>,
    pub contact_id: Option<RecordId>,
    pub owner_id: UserId,
    pub amount: i64,
    pub win_chance: u8,
    pub expected_close: Option<NaiveDate>,
    pub stage: OpportunityStage,
    #[serde(flatten)]
    pub audit: AuditDto,
}

/// List rows carry the same fields as the full DTO.
pub type OpportunityListDto = OpportunityDto;

pub struct Opportunities;

impl ModuleDefinition for Opportunities {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0x0c3959c3_15dc_44ab_8e2c_9b9e2773e65f);
    const MODULE_NAME: &'static str = "Opportunities";
    const RECORD_NAME: &'static str = "Opportunity";

    type Record = Opportunity;
    type Dto = OpportunityDto;
    type ListDto = OpportunityListDto;
    type Create = CreateOpportunity;
    type Edit = EditOpportunity;
    type Filter = OpportunityFilter;

    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("CRM Users"),
            "opportunity",
            "Opportunity",
        )
    }

    fn create_record(cmd: &CreateOpportunity, audit: AuditFields) -> Opportunity {
        Opportunity {
            id: RecordId::new(0),
            opportunity_name: cmd.opportunity_name.clone(),
            customer_id: cmd.customer_id,
            contact_id: cmd.contact_id,
            owner_id: cmd.caller.calling_user_id,
            amount: cmd.amount,
            win_chance: cmd.win_chance,
            expected_close: cmd.expected_close,
            stage: cmd.stage.unwrap_or_default(),
            audit,
        }
    }

    fn apply_edit(record: &mut Opportunity, cmd: &EditOpportunity) -> Result<(), DomainError> {
        patch_text(&mut record.opportunity_name, cmd.opportunity_name.as_deref());
        patch_opt(&mut record.customer_id, cmd.customer_id.as_ref());
        patch_opt(&mut record.contact_id, cmd.contact_id.as_ref());
        patch(&mut record.owner_id, cmd.owner_id.as_ref());
        patch(&mut record.amount, cmd.amount.as_ref());
        patch(&mut record.win_chance, cmd.win_chance.as_ref());
        patch_opt(&mut record.expected_close, cmd.expected_close.as_ref());
        patch(&mut record.stage, cmd.stage.as_ref());
        Ok(())
    }

    fn to_dto(record: &Opportunity) -> OpportunityDto {
        OpportunityDto {
            opportunity_name: record.opportunity_name.clone(),
            customer_id: record.customer_id,
            contact_id: record.contact_id,
            owner_id: record.owner_id,
            amount: record.amount,
            win_chance: record.win_chance,
            expected_close: record.expected_close,
            stage: record.stage,
            audit: AuditDto::new(record.id, &record.audit),
        }
    }

    fn to_list_dto(record: &Opportunity) -> OpportunityListDto {
        Self::to_dto(record)
    }

    fn search_fields(record: &Opportunity) -> Vec<&str> {
        vec![record.opportunity_name.as_str(), record.stage.as_str()]
    }

    fn matches(record: &Opportunity, filter: &OpportunityFilter) -> bool {
        filter.customer_id.is_none_or(|id| record.customer_id == Some(id))
            && exact_matches(filter.owner_id.as_ref(), &record.owner_id)
            && exact_matches(filter.stage.as_ref(), &record.stage)
    }
}

pub type OpportunityModule<S> = ErpModule<Opportunities, S>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use kosmos_core::{PagingSortingParameters, ResultCode};
    use kosmos_module::{FindCommand, InMemoryRecordStore};

    use crate::test_support::{AllowAll, caller};

    fn module() -> OpportunityModule<InMemoryRecordStore<Opportunity>> {
        ErpModule::new(InMemoryRecordStore::new("Opportunity"), Arc::new(AllowAll))
    }

    fn create(name: &str, customer: Option<i32>, stage: OpportunityStage) -> CreateOpportunity {
        CreateOpportunity {
            caller: caller(1),
            opportunity_name: name.to_string(),
            customer_id: customer.map(RecordId::new),
            contact_id: None,
            amount: 125_000,
            win_chance: 40,
            expected_close: NaiveDate::from_ymd_opt(2025, 6, 30),
            stage: Some(stage),
        }
    }

    #[test]
    fn win_chance_above_hundred_is_rejected() {
        let module = module();
        let mut cmd = create("Big deal", None, OpportunityStage::Prospecting);
        cmd.win_chance = 101;
        assert_eq!(module.create(&cmd).result_code, ResultCode::DataValidationError);

        let mut edit = EditOpportunity::new(caller(1), RecordId::new(1));
        edit.win_chance = Some(150);
        assert_eq!(module.edit(&edit).result_code, ResultCode::DataValidationError);
    }

    #[test]
    fn edit_updates_amount_only() {
        let module = module();
        module.create(&create("Big deal", Some(3), OpportunityStage::Prospecting)).into_result().unwrap();

        let mut edit = EditOpportunity::new(caller(2), RecordId::new(1));
        edit.amount = Some(99);
        let dto = module.edit(&edit).into_result().unwrap();
        assert_eq!(dto.amount, 99);
        assert_eq!(dto.stage, OpportunityStage::Prospecting);
        assert_eq!(dto.customer_id, Some(RecordId::new(3)));
        assert_eq!(dto.audit.updated_by, Some(UserId::new(2)));
    }

    #[test]
    fn find_filters_by_customer_and_stage() {
        let module = module();
        module.create(&create("A", Some(3), OpportunityStage::Prospecting)).into_result().unwrap();
        module.create(&create("B", Some(4), OpportunityStage::Prospecting)).into_result().unwrap();
        module.create(&create("C", Some(3), OpportunityStage::ClosedWon)).into_result().unwrap();

        let found = module.find(
            PagingSortingParameters::default(),
            &FindCommand::new(caller(1)).with_filter(OpportunityFilter {
                customer_id: Some(RecordId::new(3)),
                stage: Some(OpportunityStage::Prospecting),
                ..OpportunityFilter::default()
            }),
        );
        assert_eq!(found.total_result_count, 1);
        assert_eq!(found.data[0].opportunity_name, "A");

        let won = module.find(PagingSortingParameters::default(), &FindCommand::new(caller(1)).with_wildcard("WON"));
        assert_eq!(won.data.len(), 1);
    }

    #[test]
    fn stages_parse_case_insensitively_from_a_closed_set() {
        assert_eq!("closed won".parse::<OpportunityStage>().unwrap(), OpportunityStage::ClosedWon);
        assert_eq!(" Negotiation ".parse::<OpportunityStage>().unwrap(), OpportunityStage::Negotiation);
        assert!("Won".parse::<OpportunityStage>().is_err());
        assert!(OpportunityStage::ClosedLost.is_closed());
        assert!(!OpportunityStage::Proposal.is_closed());

        let json = serde_json::to_value(OpportunityStage::ClosedLost).unwrap();
        assert_eq!(json, "Closed Lost");
        let back: OpportunityStage = serde_json::from_value(json).unwrap();
        assert_eq!(back, OpportunityStage::ClosedLost);
    }

    #[test]
    fn creator_owns_the_opportunity_and_stage_defaults() {
        let module = module();
        let mut cmd = create("Renewal", None, OpportunityStage::Analysis);
        cmd.caller = caller(7);
        cmd.stage = None;
        let dto = module.create(&cmd).into_result().unwrap();
        assert_eq!(dto.owner_id, UserId::new(7));
        assert_eq!(dto.stage, OpportunityStage::Prospecting);

        let mut reassign = EditOpportunity::new(caller(7), dto.audit.id);
        reassign.owner_id = Some(UserId::new(8));
        reassign.stage = Some(OpportunityStage::Negotiation);
        let dto = module.edit(&reassign).into_result().unwrap();
        assert_eq!(dto.owner_id, UserId::new(8));
        assert_eq!(dto.stage, OpportunityStage::Negotiation);
    }
}
