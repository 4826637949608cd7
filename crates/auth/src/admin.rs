//! Role administration: membership and grant maintenance.
//!
//! Every operation is existence-gated and returns whether it changed
//! anything, so repeating a call is harmless.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use kosmos_core::{AuditFields, ModuleId, UserId};

use crate::permissions::{ModulePermission, PermissionKey, RolePermission};
use crate::repository::{PermissionRepository, RepositoryError};
use crate::roles::{Role, RoleName, UserRole};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("role '{0}' does not exist")]
    UnknownRole(RoleName),

    #[error("permission '{key}' does not exist in module {module_id}")]
    UnknownPermission { module_id: ModuleId, key: PermissionKey },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn role<R>(repo: &R, name: &RoleName) -> Result<Role, AdminError>
where
    R: PermissionRepository + ?Sized,
{
    repo.find_role_by_name(name)?
        .ok_or_else(|| AdminError::UnknownRole(name.clone()))
}

fn permission<R>(repo: &R, module_id: ModuleId, key: &PermissionKey) -> Result<ModulePermission, AdminError>
where
    R: PermissionRepository + ?Sized,
{
    repo.find_module_permission(module_id, key)?
        .ok_or_else(|| AdminError::UnknownPermission {
            module_id,
            key: key.clone(),
        })
}

/// Put `user` in the role. A previously revoked membership is restored.
pub fn assign_role<R>(
    repo: &R,
    user: UserId,
    role_name: &RoleName,
    actor: UserId,
    now: DateTime<Utc>,
) -> Result<bool, AdminError>
where
    R: PermissionRepository + ?Sized,
{
    let role = role(repo, role_name)?;
    match repo.find_user_role(user, role.id)? {
        Some(link) if !link.audit.is_deleted => Ok(false),
        Some(mut link) => {
            link.audit.is_deleted = false;
            link.audit.deleted_on = None;
            link.audit.deleted_by = None;
            link.audit.fill_update(actor, now);
            repo.update_user_role(link)?;
            info!(user_id = %user, role = %role_name, "role restored");
            Ok(true)
        }
        None => {
            repo.insert_user_role(UserRole::new(user, role.id, AuditFields::fill_common(actor, now)))?;
            info!(user_id = %user, role = %role_name, "role assigned");
            Ok(true)
        }
    }
}

/// Soft-delete the membership.
pub fn revoke_role<R>(
    repo: &R,
    user: UserId,
    role_name: &RoleName,
    actor: UserId,
    now: DateTime<Utc>,
) -> Result<bool, AdminError>
where
    R: PermissionRepository + ?Sized,
{
    let role = role(repo, role_name)?;
    match repo.find_user_role(user, role.id)? {
        Some(mut link) if !link.audit.is_deleted => {
            link.audit.fill_delete(actor, now);
            repo.update_user_role(link)?;
            info!(user_id = %user, role = %role_name, "role revoked");
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub fn set_permission_active<R>(
    repo: &R,
    module_id: ModuleId,
    key: &PermissionKey,
    active: bool,
    actor: UserId,
    now: DateTime<Utc>,
) -> Result<bool, AdminError>
where
    R: PermissionRepository + ?Sized,
{
    let mut row = permission(repo, module_id, key)?;
    if row.is_active == active {
        return Ok(false);
    }
    row.is_active = active;
    row.audit.fill_update(actor, now);
    repo.update_module_permission(row)?;
    info!(%module_id, permission = %key, active, "permission activation changed");
    Ok(true)
}

/// Link an existing module permission to an additional role.
pub fn grant_permission<R>(
    repo: &R,
    module_id: ModuleId,
    key: &PermissionKey,
    role_name: &RoleName,
    actor: UserId,
    now: DateTime<Utc>,
) -> Result<bool, AdminError>
where
    R: PermissionRepository + ?Sized,
{
    let role = role(repo, role_name)?;
    let row = permission(repo, module_id, key)?;
    if repo.find_role_permission(role.id, row.id)?.is_some() {
        return Ok(false);
    }
    repo.insert_role_permission(RolePermission::new(role.id, row.id, AuditFields::fill_common(actor, now)))?;
    info!(%module_id, permission = %key, role = %role_name, "permission granted");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryPermissionRepository;
    use crate::permissions::ModulePermissionSet;
    use crate::seed::seed_module_permissions;

    const PRODUCTS: ModuleId = ModuleId::from_u128(0xb8b0d255_3901_4007_b9c7_b0678f89c955);
    const ACTOR: UserId = UserId::new(1);

    fn repo() -> InMemoryPermissionRepository {
        let repo = InMemoryPermissionRepository::new();
        let set = ModulePermissionSet::crud(
            PRODUCTS,
            "Products",
            RoleName::from_static("Product Users"),
            "product",
            "Product",
        );
        seed_module_permissions(&repo, &set, ACTOR, Utc::now()).unwrap();
        repo.insert_role(Role::new(
            RoleName::from_static("Auditors"),
            AuditFields::fill_common(ACTOR, Utc::now()),
        ))
        .unwrap();
        repo
    }

    #[test]
    fn assign_is_idempotent_and_revoke_restores() {
        let repo = repo();
        let role = RoleName::from_static("Product Users");
        let user = UserId::new(9);

        assert!(assign_role(&repo, user, &role, ACTOR, Utc::now()).unwrap());
        assert!(!assign_role(&repo, user, &role, ACTOR, Utc::now()).unwrap());
        assert!(revoke_role(&repo, user, &role, ACTOR, Utc::now()).unwrap());
        assert!(!revoke_role(&repo, user, &role, ACTOR, Utc::now()).unwrap());
        assert!(assign_role(&repo, user, &role, ACTOR, Utc::now()).unwrap());

        let links = repo.user_roles_for_user(user).unwrap();
        assert_eq!(links.len(), 1);
        assert!(!links[0].audit.is_deleted);
    }

    #[test]
    fn unknown_role_or_permission_is_reported() {
        let repo = repo();
        assert_eq!(
            assign_role(&repo, UserId::new(9), &RoleName::from_static("Nobody"), ACTOR, Utc::now()),
            Err(AdminError::UnknownRole(RoleName::from_static("Nobody")))
        );
        assert!(matches!(
            set_permission_active(&repo, PRODUCTS, &PermissionKey::from_static("nope"), false, ACTOR, Utc::now()),
            Err(AdminError::UnknownPermission { .. })
        ));
    }

    #[test]
    fn grant_links_once() {
        let repo = repo();
        let auditors = RoleName::from_static("Auditors");
        let key = PermissionKey::from_static("product_read");

        assert!(grant_permission(&repo, PRODUCTS, &key, &auditors, ACTOR, Utc::now()).unwrap());
        assert!(!grant_permission(&repo, PRODUCTS, &key, &auditors, ACTOR, Utc::now()).unwrap());

        let role_id = repo.find_role_by_name(&auditors).unwrap().unwrap().id;
        assert_eq!(repo.role_permissions_for_roles(&[role_id]).unwrap().len(), 1);
    }

    #[test]
    fn toggling_activation_reports_changes() {
        let repo = repo();
        let key = PermissionKey::from_static("product_delete");
        assert!(!set_permission_active(&repo, PRODUCTS, &key, true, ACTOR, Utc::now()).unwrap());
        assert!(set_permission_active(&repo, PRODUCTS, &key, false, ACTOR, Utc::now()).unwrap());
        assert!(!repo.find_module_permission(PRODUCTS, &key).unwrap().unwrap().is_active);
    }
}
