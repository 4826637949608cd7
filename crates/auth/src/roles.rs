use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use kosmos_core::{AuditFields, RecordId, UserId, impl_record};

/// Unique display name of a role (e.g. "CRM Users").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named role. Permissions attach to it through `RolePermission` rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RecordId,
    pub name: RoleName,
    pub audit: AuditFields,
}

impl Role {
    pub fn new(name: RoleName, audit: AuditFields) -> Self {
        Self {
            id: RecordId::new(0),
            name,
            audit,
        }
    }
}

/// Membership of a user in a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub id: RecordId,
    pub user_id: UserId,
    pub role_id: RecordId,
    pub audit: AuditFields,
}

impl UserRole {
    pub fn new(user_id: UserId, role_id: RecordId, audit: AuditFields) -> Self {
        Self {
            id: RecordId::new(0),
            user_id,
            role_id,
            audit,
        }
    }
}

impl_record!(Role, UserRole);
