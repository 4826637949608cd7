//! In-memory permission registry for tests, dev, and the seed tool.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use kosmos_core::{ModuleId, Record, RecordId, UserId};

use crate::permissions::{ModulePermission, PermissionKey, RolePermission};
use crate::repository::{PermissionRepository, RepositoryError};
use crate::roles::{Role, RoleName, UserRole};

#[derive(Debug, Default)]
struct Tables {
    next_id: i32,
    roles: Vec<Role>,
    module_permissions: Vec<ModulePermission>,
    role_permissions: Vec<RolePermission>,
    user_roles: Vec<UserRole>,
}

impl Tables {
    fn assign_id<R: Record>(&mut self, record: &mut R) {
        self.next_id += 1;
        record.set_id(RecordId::new(self.next_id));
    }
}

/// Tables behind a single lock, so every insert checks uniqueness and writes
/// atomically.
#[derive(Debug, Default)]
pub struct InMemoryPermissionRepository {
    inner: RwLock<Tables>,
}

impl InMemoryPermissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.inner
            .read()
            .map_err(|_| RepositoryError::Unavailable("permission tables lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        self.inner
            .write()
            .map_err(|_| RepositoryError::Unavailable("permission tables lock poisoned".into()))
    }
}

fn replace<R: Record>(rows: &mut [R], row: R, entity: &'static str) -> Result<(), RepositoryError> {
    let id = *row.id();
    let slot = rows
        .iter_mut()
        .find(|r| *r.id() == id)
        .ok_or(RepositoryError::Missing { entity, id })?;
    *slot = row;
    Ok(())
}

impl PermissionRepository for InMemoryPermissionRepository {
    fn find_role_by_name(&self, name: &RoleName) -> Result<Option<Role>, RepositoryError> {
        Ok(self.read()?.roles.iter().find(|r| &r.name == name).cloned())
    }

    fn insert_role(&self, mut role: Role) -> Result<Role, RepositoryError> {
        let mut tables = self.write()?;
        if tables.roles.iter().any(|r| r.name == role.name) {
            return Err(RepositoryError::Duplicate {
                entity: "role",
                key: role.name.to_string(),
            });
        }
        tables.assign_id(&mut role);
        tables.roles.push(role.clone());
        Ok(role)
    }

    fn list_roles(&self) -> Result<Vec<Role>, RepositoryError> {
        Ok(self.read()?.roles.clone())
    }

    fn find_module_permission(
        &self,
        module_id: ModuleId,
        key: &PermissionKey,
    ) -> Result<Option<ModulePermission>, RepositoryError> {
        Ok(self
            .read()?
            .module_permissions
            .iter()
            .find(|p| p.module_id == module_id && &p.internal_permission_name == key)
            .cloned())
    }

    fn insert_module_permission(
        &self,
        mut permission: ModulePermission,
    ) -> Result<ModulePermission, RepositoryError> {
        let mut tables = self.write()?;
        let clash = tables.module_permissions.iter().any(|p| {
            p.module_id == permission.module_id
                && p.internal_permission_name == permission.internal_permission_name
        });
        if clash {
            return Err(RepositoryError::Duplicate {
                entity: "module permission",
                key: format!("{}/{}", permission.module_id, permission.internal_permission_name),
            });
        }
        tables.assign_id(&mut permission);
        tables.module_permissions.push(permission.clone());
        Ok(permission)
    }

    fn update_module_permission(&self, permission: ModulePermission) -> Result<(), RepositoryError> {
        replace(&mut self.write()?.module_permissions, permission, "module permission")
    }

    fn module_permissions_by_ids(
        &self,
        ids: &[RecordId],
    ) -> Result<Vec<ModulePermission>, RepositoryError> {
        Ok(self
            .read()?
            .module_permissions
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    fn list_module_permissions(&self) -> Result<Vec<ModulePermission>, RepositoryError> {
        Ok(self.read()?.module_permissions.clone())
    }

    fn find_role_permission(
        &self,
        role_id: RecordId,
        module_permission_id: RecordId,
    ) -> Result<Option<RolePermission>, RepositoryError> {
        Ok(self
            .read()?
            .role_permissions
            .iter()
            .find(|l| l.role_id == role_id && l.module_permission_id == module_permission_id)
            .cloned())
    }

    fn insert_role_permission(&self, mut link: RolePermission) -> Result<RolePermission, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.roles.iter().any(|r| r.id == link.role_id) {
            return Err(RepositoryError::Missing {
                entity: "role",
                id: link.role_id,
            });
        }
        if !tables
            .module_permissions
            .iter()
            .any(|p| p.id == link.module_permission_id)
        {
            return Err(RepositoryError::Missing {
                entity: "module permission",
                id: link.module_permission_id,
            });
        }
        if tables
            .role_permissions
            .iter()
            .any(|l| l.role_id == link.role_id && l.module_permission_id == link.module_permission_id)
        {
            return Err(RepositoryError::Duplicate {
                entity: "role permission",
                key: format!("{}/{}", link.role_id, link.module_permission_id),
            });
        }
        tables.assign_id(&mut link);
        tables.role_permissions.push(link.clone());
        Ok(link)
    }

    fn role_permissions_for_roles(
        &self,
        role_ids: &[RecordId],
    ) -> Result<Vec<RolePermission>, RepositoryError> {
        Ok(self
            .read()?
            .role_permissions
            .iter()
            .filter(|l| role_ids.contains(&l.role_id))
            .cloned()
            .collect())
    }

    fn find_user_role(
        &self,
        user_id: UserId,
        role_id: RecordId,
    ) -> Result<Option<UserRole>, RepositoryError> {
        Ok(self
            .read()?
            .user_roles
            .iter()
            .find(|l| l.user_id == user_id && l.role_id == role_id)
            .cloned())
    }

    fn insert_user_role(&self, mut link: UserRole) -> Result<UserRole, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.roles.iter().any(|r| r.id == link.role_id) {
            return Err(RepositoryError::Missing {
                entity: "role",
                id: link.role_id,
            });
        }
        if tables
            .user_roles
            .iter()
            .any(|l| l.user_id == link.user_id && l.role_id == link.role_id)
        {
            return Err(RepositoryError::Duplicate {
                entity: "user role",
                key: format!("{}/{}", link.user_id, link.role_id),
            });
        }
        tables.assign_id(&mut link);
        tables.user_roles.push(link.clone());
        Ok(link)
    }

    fn update_user_role(&self, link: UserRole) -> Result<(), RepositoryError> {
        replace(&mut self.write()?.user_roles, link, "user role")
    }

    fn user_roles_for_user(&self, user_id: UserId) -> Result<Vec<UserRole>, RepositoryError> {
        Ok(self
            .read()?
            .user_roles
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kosmos_core::AuditFields;

    fn audit() -> AuditFields {
        AuditFields::fill_common(UserId::new(1), Utc::now())
    }

    #[test]
    fn role_names_are_unique() {
        let repo = InMemoryPermissionRepository::new();
        let first = repo
            .insert_role(Role::new(RoleName::from_static("CRM Users"), audit()))
            .unwrap();
        assert_eq!(first.id, RecordId::new(1));

        let err = repo
            .insert_role(Role::new(RoleName::from_static("CRM Users"), audit()))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate { entity: "role", .. }));
        assert_eq!(repo.list_roles().unwrap().len(), 1);
    }

    #[test]
    fn links_require_existing_rows() {
        let repo = InMemoryPermissionRepository::new();
        let err = repo
            .insert_user_role(UserRole::new(UserId::new(3), RecordId::new(99), audit()))
            .unwrap_err();
        assert_eq!(
            err,
            RepositoryError::Missing {
                entity: "role",
                id: RecordId::new(99)
            }
        );
    }
}
