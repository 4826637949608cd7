use serde::{Deserialize, Serialize};

use kosmos_auth::{Capability, Caller, ModulePermissionSet, RoleName};
use kosmos_core::{
    AuditDto, AuditFields, DomainError, ModuleId, RecordId, Validate, Validator, impl_record,
};
use kosmos_module::{
    ErpModule, ModuleCommand, ModuleDefinition, TargetsRecord, exact_matches, patch, patch_text,
};

/// A state, province or region within a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: RecordId,
    pub country_id: RecordId,
    pub state_name: String,
    pub iso2: String,
    pub audit: AuditFields,
}

impl_record!(State);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateState {
    pub caller: Caller,
    pub country_id: RecordId,
    pub state_name: String,
    pub iso2: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditState {
    pub caller: Caller,
    pub id: RecordId,
    pub country_id: Option<RecordId>,
    pub state_name: Option<String>,
    pub iso2: Option<String>,
}

impl ModuleCommand for CreateState {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl ModuleCommand for EditState {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for EditState {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

impl Validate for CreateState {
    fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .positive("country_id", i64::from(self.country_id.get()))
            .required("state_name", &self.state_name)
            .max_len("state_name", Some(&self.state_name), 100)
            .exact_len("iso2", &self.iso2, 2)
            .finish()
    }
}

impl Validate for EditState {
    fn validate(&self) -> Result<(), DomainError> {
        let mut v = Validator::new();
        v.check(self.id.get() > 0, "id must be greater than zero")
            .max_len("state_name", self.state_name.as_deref(), 100);
        if let Some(country_id) = self.country_id {
            v.positive("country_id", i64::from(country_id.get()));
        }
        if let Some(iso2) = self.iso2.as_deref().filter(|c| !c.is_empty()) {
            v.exact_len("iso2", iso2, 2);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateFilter {
    pub country_id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDto {
    pub country_id: RecordId,
    pub state_name: String,
    pub iso2: String,
    #[serde(flatten)]
    pub audit: AuditDto,
}

pub type StateListDto = StateDto;

pub struct States;

impl ModuleDefinition for States {
    const MODULE_ID: ModuleId = ModuleId::from_u128(0x87fa499a_1240_43fe_8457_11d367d4eb2e);
    const MODULE_NAME: &'static str = "State";
    const RECORD_NAME: &'static str = "State";

    type Record = State;
    type Dto = StateDto;
    type ListDto = StateListDto;
    type Create = CreateState;
    type Edit = EditState;
    type Filter = StateFilter;

    /// States are public reference data: there is no read permission.
    fn permissions() -> ModulePermissionSet {
        ModulePermissionSet::crud(
            Self::MODULE_ID,
            Self::MODULE_NAME,
            RoleName::from_static("State Users"),
            "state",
            "State",
        )
        .without(Capability::Read)
    }

    fn create_record(cmd: &CreateState, audit: AuditFields) -> State {
        State {
            id: RecordId::new(0),
            country_id: cmd.country_id,
            state_name: cmd.state_name.clone(),
            iso2: cmd.iso2.to_ascii_uppercase(),
            audit,
        }
    }

    fn apply_edit(state: &mut State, cmd: &EditState) -> Result<(), DomainError> {
        patch(&mut state.country_id, cmd.country_id.as_ref());
        patch_text(&mut state.state_name, cmd.state_name.as_deref());
        patch_text(
            &mut state.iso2,
            cmd.iso2.as_deref().map(str::to_ascii_uppercase).as_deref(),
        );
        Ok(())
    }

    fn to_dto(state: &State) -> StateDto {
        StateDto {
            country_id: state.country_id,
            state_name: state.state_name.clone(),
            iso2: state.iso2.clone(),
            audit: AuditDto::new(state.id, &state.audit),
        }
    }

    fn to_list_dto(state: &State) -> StateListDto {
        Self::to_dto(state)
    }

    fn search_fields(state: &State) -> Vec<&str> {
        vec![state.state_name.as_str(), state.iso2.as_str()]
    }

    fn matches(state: &State, filter: &StateFilter) -> bool {
        exact_matches(filter.country_id.as_ref(), &state.country_id)
    }
}

pub type StateModule<S> = ErpModule<States, S>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use kosmos_core::{PagingSortingParameters, ResultCode};
    use kosmos_module::{DeleteCommand, FindCommand, InMemoryRecordStore};

    use crate::test_support::{AllowExcept, caller};

    const WRITE_ONLY_DENIED: &[&str] = &["state_edit", "state_delete"];

    fn texas() -> CreateState {
        CreateState {
            caller: caller(1),
            country_id: RecordId::new(1),
            state_name: "Texas".into(),
            iso2: "tx".into(),
        }
    }

    #[test]
    fn declares_no_read_permission() {
        let set = States::permissions();
        assert!(set.key_for(Capability::Read).is_none());
        assert_eq!(set.key_for(Capability::Write).map(|k| k.as_str()), Some("state_create"));
        assert_eq!(set.permissions.len(), 3);
    }

    #[test]
    fn reads_are_open_but_writes_are_gated() {
        let module: StateModule<_> = ErpModule::new(
            InMemoryRecordStore::new("State"),
            Arc::new(AllowExcept(WRITE_ONLY_DENIED)),
        );
        let created = module.create(&texas()).into_result().unwrap();
        assert_eq!(created.iso2, "TX");

        assert!(module.get_dto(&caller(2), RecordId::new(1)).success);
        assert_eq!(
            module.find(PagingSortingParameters::default(), &FindCommand::new(caller(2))).total_result_count,
            1
        );
        assert_eq!(
            module.delete(&DeleteCommand::new(caller(2), RecordId::new(1))).result_code,
            ResultCode::InvalidPermission
        );
    }

    #[test]
    fn iso2_must_be_two_characters() {
        let mut cmd = texas();
        cmd.iso2 = "TEX".into();
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn find_by_country() {
        let module: StateModule<_> =
            ErpModule::new(InMemoryRecordStore::new("State"), Arc::new(AllowExcept(&[])));
        module.create(&texas()).into_result().unwrap();
        module
            .create(&CreateState {
                caller: caller(1),
                country_id: RecordId::new(2),
                state_name: "Ontario".into(),
                iso2: "ON".into(),
            })
            .into_result()
            .unwrap();

        let found = module.find(
            PagingSortingParameters::default(),
            &FindCommand::new(caller(1)).with_filter(StateFilter {
                country_id: Some(RecordId::new(2)),
            }),
        );
        assert_eq!(found.total_result_count, 1);
        assert_eq!(found.data[0].state_name, "Ontario");
    }
}
