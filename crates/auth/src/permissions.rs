//! Module permission rows, role links, and the per-module permission sets
//! that the seeder materialises.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use kosmos_core::{AuditFields, ModuleId, RecordId, impl_record};

use crate::capability::{Capabilities, Capability};
use crate::roles::RoleName;

/// Stable internal key of a module permission (e.g. `"lead_read"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionKey(Cow<'static, str>);

impl PermissionKey {
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

impl core::fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registry entry: one (module, internal key) with its capability flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePermission {
    pub id: RecordId,
    pub module_id: ModuleId,
    pub module_name: String,
    pub internal_permission_name: PermissionKey,
    pub permission_name: String,
    #[serde(flatten)]
    pub flags: Capabilities,
    pub is_active: bool,
    pub audit: AuditFields,
}

/// Join row granting a module permission to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    pub id: RecordId,
    pub role_id: RecordId,
    pub module_permission_id: RecordId,
    pub audit: AuditFields,
}

impl RolePermission {
    pub fn new(role_id: RecordId, module_permission_id: RecordId, audit: AuditFields) -> Self {
        Self {
            id: RecordId::new(0),
            role_id,
            module_permission_id,
            audit,
        }
    }
}

impl_record!(ModulePermission, RolePermission);

/// One permission a module declares: which flag it grants, under which key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionDefinition {
    pub capability: Capability,
    pub key: PermissionKey,
    pub display_name: Cow<'static, str>,
}

/// Everything the seeder needs to know about one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModulePermissionSet {
    pub module_id: ModuleId,
    pub module_name: Cow<'static, str>,
    pub role: RoleName,
    pub permissions: Vec<PermissionDefinition>,
}

impl ModulePermissionSet {
    pub fn new(
        module_id: ModuleId,
        module_name: impl Into<Cow<'static, str>>,
        role: RoleName,
    ) -> Self {
        Self {
            module_id,
            module_name: module_name.into(),
            role,
            permissions: Vec::new(),
        }
    }

    /// The standard four: `{prefix}_read|create|edit|delete`, displayed as
    /// "Read {label}", "Create {label}", ...
    pub fn crud(
        module_id: ModuleId,
        module_name: impl Into<Cow<'static, str>>,
        role: RoleName,
        prefix: &str,
        label: &str,
    ) -> Self {
        Self::new(module_id, module_name, role)
            .with(Capability::Read, format!("{prefix}_read"), format!("Read {label}"))
            .with(Capability::Write, format!("{prefix}_create"), format!("Create {label}"))
            .with(Capability::Edit, format!("{prefix}_edit"), format!("Edit {label}"))
            .with(Capability::Delete, format!("{prefix}_delete"), format!("Delete {label}"))
    }

    pub fn with(
        mut self,
        capability: Capability,
        key: impl Into<Cow<'static, str>>,
        display_name: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.permissions.push(PermissionDefinition {
            capability,
            key: PermissionKey::new(key),
            display_name: display_name.into(),
        });
        self
    }

    /// Drop the permission for `capability` (the module does not gate it).
    pub fn without(mut self, capability: Capability) -> Self {
        self.permissions.retain(|p| p.capability != capability);
        self
    }

    /// Internal key guarding `capability`, if the module declares one.
    pub fn key_for(&self, capability: Capability) -> Option<&PermissionKey> {
        self.permissions
            .iter()
            .find(|p| p.capability == capability)
            .map(|p| &p.key)
    }
}
