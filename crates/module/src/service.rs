//! `ErpModule`: the generic Get / Find / Create / Edit / Delete service.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use kosmos_auth::{Authorizer, Caller, Capability, ModulePermissionSet};
use kosmos_core::paging::DEFAULT_PAGE_SIZE;
use kosmos_core::{
    AuditFields, DomainError, Entity, PagingResult, PagingSortingParameters, Record, RecordId,
    Response, ResultCode, Validate,
};

use crate::definition::{FindCommand, ModuleCommand, ModuleDefinition, TargetsRecord, wildcard_matches};
use crate::store::{RecordStore, StoreError};

pub const DEFAULT_MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModuleError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ModuleError {
    pub fn result_code(&self) -> ResultCode {
        match self {
            ModuleError::Domain(err) => err.result_code(),
            ModuleError::Store(_) => ResultCode::Error,
        }
    }

    fn into_response<T>(self) -> Response<T> {
        Response::error(self.to_string(), self.result_code())
    }

    fn into_paging<T>(self) -> PagingResult<T> {
        PagingResult::error(self.to_string(), self.result_code())
    }
}

/// Page size applied when a request asks for none, and the hard cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PagingLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// One business module: a definition `D` over a record store `S`.
///
/// Every operation returns an envelope; nothing here panics or propagates.
pub struct ErpModule<D, S> {
    store: S,
    authorizer: Arc<dyn Authorizer>,
    permissions: ModulePermissionSet,
    limits: PagingLimits,
    _definition: PhantomData<fn() -> D>,
}

impl<D, S> ErpModule<D, S>
where
    D: ModuleDefinition,
    S: RecordStore<D::Record>,
{
    pub fn new(store: S, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            store,
            authorizer,
            permissions: D::permissions(),
            limits: PagingLimits::default(),
            _definition: PhantomData,
        }
    }

    pub fn with_paging_limits(mut self, limits: PagingLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn permissions(&self) -> &ModulePermissionSet {
        &self.permissions
    }

    /// Capabilities the module declares no permission for are not gated.
    fn authorize(&self, caller: &Caller, capability: Capability) -> Result<(), DomainError> {
        let Some(key) = self.permissions.key_for(capability) else {
            return Ok(());
        };
        if self.authorizer.has_permission(caller, key, capability.into()) {
            Ok(())
        } else {
            debug!(
                module = D::MODULE_NAME,
                user_id = %caller.calling_user_id,
                permission = %key,
                "permission denied"
            );
            Err(DomainError::InvalidPermission)
        }
    }

    fn load(&self, id: RecordId) -> Result<D::Record, ModuleError> {
        self.store
            .get(id)?
            .ok_or_else(|| DomainError::not_found(D::RECORD_NAME).into())
    }

    fn log_failure(&self, operation: &'static str, err: &ModuleError) {
        match err {
            ModuleError::Store(error) => {
                warn!(module = D::MODULE_NAME, operation, %error, "record store failure")
            }
            ModuleError::Domain(error) => {
                debug!(module = D::MODULE_NAME, operation, %error, "operation rejected")
            }
        }
    }

    fn respond<T>(&self, operation: &'static str, result: Result<T, ModuleError>) -> Response<T> {
        match result {
            Ok(data) => Response::ok(data),
            Err(err) => {
                self.log_failure(operation, &err);
                err.into_response()
            }
        }
    }

    /// Single record by id. Soft-deleted rows are still returned.
    pub fn get_dto(&self, caller: &Caller, id: RecordId) -> Response<D::Dto> {
        let result = self
            .authorize(caller, Capability::Read)
            .map_err(ModuleError::from)
            .and_then(|()| self.load(id))
            .map(|record| D::to_dto(&record));
        self.respond("get", result)
    }

    pub fn create(&self, cmd: &D::Create) -> Response<D::Dto> {
        let result = self.try_create(cmd);
        self.respond("create", result)
    }

    fn try_create(&self, cmd: &D::Create) -> Result<D::Dto, ModuleError> {
        cmd.validate()?;
        let caller = cmd.caller();
        self.authorize(caller, Capability::Write)?;

        let audit = AuditFields::fill_common(caller.calling_user_id, Utc::now());
        let stored = self.store.insert(D::create_record(cmd, audit))?;
        info!(
            module = D::MODULE_NAME,
            id = %stored.id(),
            user_id = %caller.calling_user_id,
            "record created"
        );
        Ok(D::to_dto(&stored))
    }

    pub fn edit(&self, cmd: &D::Edit) -> Response<D::Dto> {
        let result = self.try_edit(cmd);
        self.respond("edit", result)
    }

    fn try_edit(&self, cmd: &D::Edit) -> Result<D::Dto, ModuleError> {
        cmd.validate()?;
        let caller = cmd.caller();
        self.authorize(caller, Capability::Edit)?;

        let mut record = self.load(cmd.record_id())?;
        D::apply_edit(&mut record, cmd)?;
        record
            .audit_mut()
            .fill_update(caller.calling_user_id, Utc::now());
        self.store.update(record.clone())?;
        info!(
            module = D::MODULE_NAME,
            id = %record.id(),
            user_id = %caller.calling_user_id,
            "record updated"
        );
        Ok(D::to_dto(&record))
    }

    /// Soft delete. Deleting an already-deleted record keeps the original
    /// deletion stamp.
    pub fn delete<C>(&self, cmd: &C) -> Response<D::Dto>
    where
        C: Validate + TargetsRecord,
    {
        let result = self.try_delete(cmd);
        self.respond("delete", result)
    }

    fn try_delete<C>(&self, cmd: &C) -> Result<D::Dto, ModuleError>
    where
        C: Validate + TargetsRecord,
    {
        cmd.validate()?;
        let caller = cmd.caller();
        self.authorize(caller, Capability::Delete)?;

        let mut record = self.load(cmd.record_id())?;
        if !record.is_deleted() {
            record
                .audit_mut()
                .fill_delete(caller.calling_user_id, Utc::now());
            self.store.update(record.clone())?;
            info!(
                module = D::MODULE_NAME,
                id = %record.id(),
                user_id = %caller.calling_user_id,
                "record deleted"
            );
        }
        Ok(D::to_dto(&record))
    }

    /// Live records matching the wildcard and the module filter, sorted by
    /// id and paged. `total_result_count` counts every match.
    pub fn find(
        &self,
        params: PagingSortingParameters,
        cmd: &FindCommand<D::Filter>,
    ) -> PagingResult<D::ListDto> {
        let matched = self.search(cmd.caller(), cmd.wildcard.as_deref(), Some(&cmd.filter));
        match matched {
            Ok(records) => {
                let total = records.len();
                PagingResult::ok(self.page(params, records), total)
            }
            Err(err) => {
                self.log_failure("find", &err);
                err.into_paging()
            }
        }
    }

    /// Wildcard-only find; the count reflects the returned page.
    pub fn global_search(
        &self,
        caller: &Caller,
        params: PagingSortingParameters,
        wildcard: &str,
    ) -> PagingResult<D::ListDto> {
        match self.search(caller, Some(wildcard), None) {
            Ok(records) => {
                let page = self.page(params, records);
                let count = page.len();
                PagingResult::ok(page, count)
            }
            Err(err) => {
                self.log_failure("global_search", &err);
                err.into_paging()
            }
        }
    }

    fn search(
        &self,
        caller: &Caller,
        wildcard: Option<&str>,
        filter: Option<&D::Filter>,
    ) -> Result<Vec<D::Record>, ModuleError> {
        self.authorize(caller, Capability::Read)?;
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|r| !r.is_deleted())
            .filter(|r| {
                // Every record is also findable by its guid.
                let guid = r.audit().guid.to_string();
                let mut fields = D::search_fields(r);
                fields.push(&guid);
                wildcard_matches(wildcard, &fields)
            })
            .filter(|r| filter.is_none_or(|f| D::matches(r, f)))
            .collect())
    }

    fn page(&self, params: PagingSortingParameters, records: Vec<D::Record>) -> Vec<D::ListDto> {
        params
            .normalized(self.limits.default_page_size, self.limits.max_page_size)
            .sort_and_page(records, |r| *r.id())
            .iter()
            .map(D::to_list_dto)
            .collect()
    }
}
