use chrono::{DateTime, Utc};

use kosmos_auth::{
    ModulePermissionSet, PermissionRepository, SeedError, SeedReport, seed_module_permissions,
};
use kosmos_core::{ModuleId, UserId};

use crate::definition::ModuleDefinition;
use crate::service::ErpModule;
use crate::store::RecordStore;

/// Startup hook: register a module's role and permissions.
pub trait SeedPermissions: Send + Sync {
    fn module_id(&self) -> ModuleId;

    fn module_name(&self) -> &str;

    fn permission_set(&self) -> ModulePermissionSet;

    fn seed_permissions(
        &self,
        repo: &dyn PermissionRepository,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<SeedReport, SeedError> {
        seed_module_permissions(repo, &self.permission_set(), actor, now)
    }
}

impl<D, S> SeedPermissions for ErpModule<D, S>
where
    D: ModuleDefinition,
    S: RecordStore<D::Record>,
{
    fn module_id(&self) -> ModuleId {
        D::MODULE_ID
    }

    fn module_name(&self) -> &str {
        D::MODULE_NAME
    }

    fn permission_set(&self) -> ModulePermissionSet {
        self.permissions().clone()
    }
}
