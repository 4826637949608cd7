//! Idempotent, existence-gated seeding of one module's permissions.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use kosmos_core::{AuditFields, RecordId, UserId};

use crate::permissions::{ModulePermission, ModulePermissionSet, PermissionKey, RolePermission};
use crate::repository::{PermissionRepository, RepositoryError};
use crate::roles::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("module {0} declares an empty role name")]
    EmptyRoleName(String),

    #[error("permission key '{0}' is declared more than once")]
    DuplicateKey(PermissionKey),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// What one seeding pass actually created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeedReport {
    pub created_role: bool,
    pub created_permissions: usize,
    pub created_links: usize,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        !self.created_role && self.created_permissions == 0 && self.created_links == 0
    }
}

/// Ensure the module's role exists, then insert every declared permission
/// that is missing (by module id + internal key) and link it to the role.
///
/// Rows that already exist are left untouched, so a permission an
/// administrator deactivated stays inactive across boots.
pub fn seed_module_permissions<R>(
    repo: &R,
    set: &ModulePermissionSet,
    actor: UserId,
    now: DateTime<Utc>,
) -> Result<SeedReport, SeedError>
where
    R: PermissionRepository + ?Sized,
{
    if set.role.as_str().trim().is_empty() {
        return Err(SeedError::EmptyRoleName(set.module_name.to_string()));
    }
    let mut seen = HashSet::new();
    for def in &set.permissions {
        if !seen.insert(&def.key) {
            return Err(SeedError::DuplicateKey(def.key.clone()));
        }
    }

    let mut report = SeedReport::default();

    let role = match repo.find_role_by_name(&set.role)? {
        Some(role) => role,
        None => {
            report.created_role = true;
            repo.insert_role(Role::new(set.role.clone(), AuditFields::fill_common(actor, now)))?
        }
    };

    for def in &set.permissions {
        let permission = match repo.find_module_permission(set.module_id, &def.key)? {
            Some(existing) => existing,
            None => {
                let inserted = repo.insert_module_permission(ModulePermission {
                    id: RecordId::new(0),
                    module_id: set.module_id,
                    module_name: set.module_name.to_string(),
                    internal_permission_name: def.key.clone(),
                    permission_name: def.display_name.to_string(),
                    flags: def.capability.into(),
                    is_active: true,
                    audit: AuditFields::fill_common(actor, now),
                })?;
                report.created_permissions += 1;
                inserted
            }
        };

        // Checked even for existing rows: an earlier run may have stopped
        // between the insert and the link.
        if repo.find_role_permission(role.id, permission.id)?.is_none() {
            repo.insert_role_permission(RolePermission::new(
                role.id,
                permission.id,
                AuditFields::fill_common(actor, now),
            ))?;
            report.created_links += 1;
        }
    }

    debug!(
        module_id = %set.module_id,
        module = %set.module_name,
        role = %set.role,
        created_role = report.created_role,
        created_permissions = report.created_permissions,
        created_links = report.created_links,
        "module permissions seeded"
    );

    Ok(report)
}
