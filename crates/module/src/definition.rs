//! The per-module half of the CRUD template.

use serde::{Deserialize, Serialize};

use kosmos_auth::{Caller, ModulePermissionSet};
use kosmos_core::{AuditFields, DomainError, ModuleId, Record, RecordId, Validate};

/// Every command carries the caller it runs on behalf of.
pub trait ModuleCommand {
    fn caller(&self) -> &Caller;
}

/// Commands that address one existing record.
pub trait TargetsRecord: ModuleCommand {
    fn record_id(&self) -> RecordId;
}

/// Describes one business module: identity, permissions, record shape and
/// the mapping between commands, records and DTOs.
pub trait ModuleDefinition: Send + Sync + 'static {
    const MODULE_ID: ModuleId;
    const MODULE_NAME: &'static str;
    /// Singular name used in messages ("Lead not found").
    const RECORD_NAME: &'static str;

    type Record: Record;
    type Dto: Serialize + Clone + Send;
    type ListDto: Serialize + Clone + Send;
    type Create: Validate + ModuleCommand;
    type Edit: Validate + TargetsRecord;
    /// Module-specific exact-match filters for `find`.
    type Filter: Default;

    fn permissions() -> ModulePermissionSet;

    /// Build a new record; `audit` is already filled for creation.
    fn create_record(cmd: &Self::Create, audit: AuditFields) -> Self::Record;

    /// Apply only the fields present on the command.
    fn apply_edit(record: &mut Self::Record, cmd: &Self::Edit) -> Result<(), DomainError>;

    fn to_dto(record: &Self::Record) -> Self::Dto;

    fn to_list_dto(record: &Self::Record) -> Self::ListDto;

    /// Text fields the wildcard searches.
    fn search_fields(record: &Self::Record) -> Vec<&str>;

    fn matches(_record: &Self::Record, _filter: &Self::Filter) -> bool {
        true
    }
}

/// Soft delete of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCommand {
    pub caller: Caller,
    pub id: RecordId,
}

impl DeleteCommand {
    pub fn new(caller: Caller, id: RecordId) -> Self {
        Self { caller, id }
    }
}

impl ModuleCommand for DeleteCommand {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl TargetsRecord for DeleteCommand {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

impl Validate for DeleteCommand {
    fn validate(&self) -> Result<(), DomainError> {
        if self.id.get() <= 0 {
            return Err(DomainError::validation("id must be greater than zero"));
        }
        Ok(())
    }
}

/// Find: optional wildcard plus the module's exact filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindCommand<F> {
    pub caller: Caller,
    pub wildcard: Option<String>,
    pub filter: F,
}

impl<F: Default> FindCommand<F> {
    pub fn new(caller: Caller) -> Self {
        Self {
            caller,
            wildcard: None,
            filter: F::default(),
        }
    }

    pub fn with_wildcard(mut self, wildcard: impl Into<String>) -> Self {
        self.wildcard = Some(wildcard.into());
        self
    }

    pub fn with_filter(mut self, filter: F) -> Self {
        self.filter = filter;
        self
    }
}

impl<F> ModuleCommand for FindCommand<F> {
    fn caller(&self) -> &Caller {
        &self.caller
    }
}

/// Case-insensitive substring match of `wildcard` against any field.
/// A blank wildcard matches everything.
pub fn wildcard_matches(wildcard: Option<&str>, fields: &[&str]) -> bool {
    let needle = match wildcard.map(str::trim) {
        None | Some("") => return true,
        Some(w) => w.to_lowercase(),
    };
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

/// `None` filter accepts any value.
pub fn exact_matches<T: PartialEq>(filter: Option<&T>, value: &T) -> bool {
    filter.is_none_or(|f| f == value)
}
