//! Storage port for the permission registry.

use std::sync::Arc;

use thiserror::Error;

use kosmos_core::{ModuleId, RecordId, UserId};

use crate::permissions::{ModulePermission, PermissionKey, RolePermission};
use crate::roles::{Role, RoleName, UserRole};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("permission storage unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate {entity}: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("{entity} {id} not found")]
    Missing { entity: &'static str, id: RecordId },
}

/// Persistence of roles, module permissions and their links.
///
/// Inserts enforce the natural-key uniqueness rules (role name;
/// module id + internal key; role + permission; user + role) and return
/// [`RepositoryError::Duplicate`] on a clash. Inserts assign the record id.
pub trait PermissionRepository: Send + Sync {
    fn find_role_by_name(&self, name: &RoleName) -> Result<Option<Role>, RepositoryError>;
    fn insert_role(&self, role: Role) -> Result<Role, RepositoryError>;
    fn list_roles(&self) -> Result<Vec<Role>, RepositoryError>;

    fn find_module_permission(
        &self,
        module_id: ModuleId,
        key: &PermissionKey,
    ) -> Result<Option<ModulePermission>, RepositoryError>;
    fn insert_module_permission(
        &self,
        permission: ModulePermission,
    ) -> Result<ModulePermission, RepositoryError>;
    fn update_module_permission(&self, permission: ModulePermission) -> Result<(), RepositoryError>;
    fn module_permissions_by_ids(
        &self,
        ids: &[RecordId],
    ) -> Result<Vec<ModulePermission>, RepositoryError>;
    fn list_module_permissions(&self) -> Result<Vec<ModulePermission>, RepositoryError>;

    fn find_role_permission(
        &self,
        role_id: RecordId,
        module_permission_id: RecordId,
    ) -> Result<Option<RolePermission>, RepositoryError>;
    fn insert_role_permission(&self, link: RolePermission) -> Result<RolePermission, RepositoryError>;
    fn role_permissions_for_roles(
        &self,
        role_ids: &[RecordId],
    ) -> Result<Vec<RolePermission>, RepositoryError>;

    fn find_user_role(
        &self,
        user_id: UserId,
        role_id: RecordId,
    ) -> Result<Option<UserRole>, RepositoryError>;
    fn insert_user_role(&self, link: UserRole) -> Result<UserRole, RepositoryError>;
    fn update_user_role(&self, link: UserRole) -> Result<(), RepositoryError>;
    fn user_roles_for_user(&self, user_id: UserId) -> Result<Vec<UserRole>, RepositoryError>;
}

impl<R> PermissionRepository for Arc<R>
where
    R: PermissionRepository + ?Sized,
{
    fn find_role_by_name(&self, name: &RoleName) -> Result<Option<Role>, RepositoryError> {
        (**self).find_role_by_name(name)
    }

    fn insert_role(&self, role: Role) -> Result<Role, RepositoryError> {
        (**self).insert_role(role)
    }

    fn list_roles(&self) -> Result<Vec<Role>, RepositoryError> {
        (**self).list_roles()
    }

    fn find_module_permission(
        &self,
        module_id: ModuleId,
        key: &PermissionKey,
    ) -> Result<Option<ModulePermission>, RepositoryError> {
        (**self).find_module_permission(module_id, key)
    }

    fn insert_module_permission(
        &self,
        permission: ModulePermission,
    ) -> Result<ModulePermission, RepositoryError> {
        (**self).insert_module_permission(permission)
    }

    fn update_module_permission(&self, permission: ModulePermission) -> Result<(), RepositoryError> {
        (**self).update_module_permission(permission)
    }

    fn module_permissions_by_ids(
        &self,
        ids: &[RecordId],
    ) -> Result<Vec<ModulePermission>, RepositoryError> {
        (**self).module_permissions_by_ids(ids)
    }

    fn list_module_permissions(&self) -> Result<Vec<ModulePermission>, RepositoryError> {
        (**self).list_module_permissions()
    }

    fn find_role_permission(
        &self,
        role_id: RecordId,
        module_permission_id: RecordId,
    ) -> Result<Option<RolePermission>, RepositoryError> {
        (**self).find_role_permission(role_id, module_permission_id)
    }

    fn insert_role_permission(&self, link: RolePermission) -> Result<RolePermission, RepositoryError> {
        (**self).insert_role_permission(link)
    }

    fn role_permissions_for_roles(
        &self,
        role_ids: &[RecordId],
    ) -> Result<Vec<RolePermission>, RepositoryError> {
        (**self).role_permissions_for_roles(role_ids)
    }

    fn find_user_role(
        &self,
        user_id: UserId,
        role_id: RecordId,
    ) -> Result<Option<UserRole>, RepositoryError> {
        (**self).find_user_role(user_id, role_id)
    }

    fn insert_user_role(&self, link: UserRole) -> Result<UserRole, RepositoryError> {
        (**self).insert_user_role(link)
    }

    fn update_user_role(&self, link: UserRole) -> Result<(), RepositoryError> {
        (**self).update_user_role(link)
    }

    fn user_roles_for_user(&self, user_id: UserId) -> Result<Vec<UserRole>, RepositoryError> {
        (**self).user_roles_for_user(user_id)
    }
}
