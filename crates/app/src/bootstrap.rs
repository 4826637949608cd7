//! Process startup: build the services, seed permissions, describe the
//! resulting registry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use kosmos_auth::{Capabilities, PermissionKey, PermissionRepository, RepositoryError, RoleName};
use kosmos_core::{ModuleId, RecordId};
use kosmos_infra::{AppConfig, SeedSummary};

use crate::services::AppServices;

pub struct Bootstrapped {
    pub services: AppServices,
    pub seeding: Vec<SeedSummary>,
}

impl Bootstrapped {
    pub fn failed_modules(&self) -> usize {
        self.seeding.iter().filter(|s| s.is_failure()).count()
    }

    pub fn snapshot(&self) -> Result<RegistrySnapshot, RepositoryError> {
        let roles = RegistrySnapshot::roles(&*self.services.repository)?;
        Ok(RegistrySnapshot {
            roles,
            seeding: self.seeding.clone(),
        })
    }
}

pub fn bootstrap(config: &AppConfig) -> Bootstrapped {
    bootstrap_at(config, Utc::now())
}

pub fn bootstrap_at(config: &AppConfig, now: DateTime<Utc>) -> Bootstrapped {
    let services = AppServices::new(config);
    let seeding = services.seed(config.seed_actor, now);
    info!(
        modules = services.registry().len(),
        actor = %config.seed_actor,
        "services ready"
    );
    Bootstrapped { services, seeding }
}

/// Roles with the live permissions linked to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    pub roles: Vec<RoleEntry>,
    pub seeding: Vec<SeedSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleEntry {
    pub role_id: RecordId,
    pub role_name: RoleName,
    pub permissions: Vec<PermissionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionEntry {
    pub module_id: ModuleId,
    pub module_name: String,
    pub internal_permission_name: PermissionKey,
    pub permission_name: String,
    #[serde(flatten)]
    pub flags: Capabilities,
    pub is_active: bool,
}

impl RegistrySnapshot {
    pub fn roles(repo: &dyn PermissionRepository) -> Result<Vec<RoleEntry>, RepositoryError> {
        let mut entries = Vec::new();
        for role in repo.list_roles()?.into_iter().filter(|r| !r.audit.is_deleted) {
            let mut ids: Vec<RecordId> = repo
                .role_permissions_for_roles(&[role.id])?
                .into_iter()
                .filter(|link| !link.audit.is_deleted)
                .map(|link| link.module_permission_id)
                .collect();
            ids.sort();
            ids.dedup();

            let permissions = repo
                .module_permissions_by_ids(&ids)?
                .into_iter()
                .filter(|p| !p.audit.is_deleted)
                .map(|p| PermissionEntry {
                    module_id: p.module_id,
                    module_name: p.module_name,
                    internal_permission_name: p.internal_permission_name,
                    permission_name: p.permission_name,
                    flags: p.flags,
                    is_active: p.is_active,
                })
                .collect();

            entries.push(RoleEntry {
                role_id: role.id,
                role_name: role.name,
                permissions,
            });
        }
        Ok(entries)
    }

    pub fn permission_count(&self) -> usize {
        self.roles.iter().map(|r| r.permissions.len()).sum()
    }
}
