use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use kosmos_core::{RecordId, UserId};

use crate::capability::Capabilities;
use crate::claims::TokenValidator;
use crate::permissions::{ModulePermission, PermissionKey};
use crate::principal::Caller;
use crate::repository::{PermissionRepository, RepositoryError};

/// Permission check used at the module boundary.
///
/// Implementations must deny by default: any failure to prove the grant
/// resolves to `false`.
pub trait Authorizer: Send + Sync {
    fn has_permission(&self, caller: &Caller, key: &PermissionKey, required: Capabilities) -> bool;
}

/// Repository-backed checker: token → user roles → active rows for the key →
/// union of flags.
pub struct PermissionChecker<R, V> {
    repo: R,
    tokens: V,
}

/// Roles a user currently holds and the active rows those roles link to.
struct Grants {
    role_ids: Vec<RecordId>,
    rows: Vec<ModulePermission>,
}

impl<R, V> PermissionChecker<R, V>
where
    R: PermissionRepository,
    V: TokenValidator,
{
    pub fn new(repo: R, tokens: V) -> Self {
        Self { repo, tokens }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn grants(&self, user: UserId) -> Result<Grants, RepositoryError> {
        let role_ids: Vec<RecordId> = self
            .repo
            .user_roles_for_user(user)?
            .into_iter()
            .filter(|link| !link.audit.is_deleted)
            .map(|link| link.role_id)
            .collect();
        if role_ids.is_empty() {
            return Ok(Grants {
                role_ids,
                rows: Vec::new(),
            });
        }

        let mut permission_ids: Vec<RecordId> = self
            .repo
            .role_permissions_for_roles(&role_ids)?
            .into_iter()
            .filter(|link| !link.audit.is_deleted)
            .map(|link| link.module_permission_id)
            .collect();
        permission_ids.sort();
        permission_ids.dedup();

        let rows = self
            .repo
            .module_permissions_by_ids(&permission_ids)?
            .into_iter()
            .filter(|p| p.is_active && !p.audit.is_deleted)
            .collect();

        Ok(Grants { role_ids, rows })
    }

    pub fn has_permission_at(
        &self,
        caller: &Caller,
        key: &PermissionKey,
        required: Capabilities,
        now: DateTime<Utc>,
    ) -> bool {
        if required.is_empty() {
            return false;
        }
        if let Err(error) = self.tokens.validate_for(&caller.token, caller.calling_user_id, now) {
            debug!(user_id = %caller.calling_user_id, permission = %key, %error, "token rejected");
            return false;
        }
        let grants = match self.grants(caller.calling_user_id) {
            Ok(grants) => grants,
            Err(error) => {
                warn!(user_id = %caller.calling_user_id, permission = %key, %error, "permission lookup failed");
                return false;
            }
        };

        grants
            .rows
            .iter()
            .filter(|p| &p.internal_permission_name == key)
            .fold(Capabilities::NONE, |acc, p| acc | p.flags)
            .contains_all(required)
    }

    /// Same resolution as [`Authorizer::has_permission`], with the reasoning.
    pub fn explain_at(
        &self,
        caller: &Caller,
        key: &PermissionKey,
        required: Capabilities,
        now: DateTime<Utc>,
    ) -> AuthorizationExplanation {
        if let Err(error) = self.tokens.validate_for(&caller.token, caller.calling_user_id, now) {
            return AuthorizationExplanation::denied(
                caller.calling_user_id,
                key,
                required,
                DenialKind::InvalidToken,
                format!("Token rejected: {error}"),
                vec!["Present a current token issued to the calling user".to_string()],
            );
        }

        let resolved = self.grants(caller.calling_user_id).and_then(|grants| {
            let names = self.repo.list_roles()?;
            let roles = names
                .into_iter()
                .filter(|r| grants.role_ids.contains(&r.id))
                .map(|r| r.name.to_string())
                .collect::<Vec<_>>();
            Ok((roles, grants.rows))
        });

        match resolved {
            Ok((roles, rows)) => explain_grants(caller.calling_user_id, key, required, roles, &rows),
            Err(error) => AuthorizationExplanation::denied(
                caller.calling_user_id,
                key,
                required,
                DenialKind::LookupFailed,
                format!("Permission lookup failed: {error}"),
                Vec::new(),
            ),
        }
    }

    pub fn explain(
        &self,
        caller: &Caller,
        key: &PermissionKey,
        required: Capabilities,
    ) -> AuthorizationExplanation {
        self.explain_at(caller, key, required, Utc::now())
    }

    /// Every permission key the user holds, with its unioned flags.
    pub fn effective_capabilities(
        &self,
        user: UserId,
    ) -> Result<BTreeMap<PermissionKey, Capabilities>, RepositoryError> {
        let mut effective: BTreeMap<PermissionKey, Capabilities> = BTreeMap::new();
        for row in self.grants(user)?.rows {
            let entry = effective.entry(row.internal_permission_name).or_default();
            *entry = *entry | row.flags;
        }
        Ok(effective)
    }
}

impl<R, V> Authorizer for PermissionChecker<R, V>
where
    R: PermissionRepository,
    V: TokenValidator,
{
    fn has_permission(&self, caller: &Caller, key: &PermissionKey, required: Capabilities) -> bool {
        self.has_permission_at(caller, key, required, Utc::now())
    }
}

/// Why a check was granted or denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationExplanation {
    pub user_id: UserId,
    pub permission: PermissionKey,
    pub required: Capabilities,
    pub granted: bool,
    pub reason: String,
    pub roles: Vec<String>,
    pub matching_permissions: Vec<MatchingPermission>,
    pub effective: Capabilities,
    pub missing: Capabilities,
    pub denial_reason: Option<DenialReason>,
}

/// An active row (reachable from one of the user's roles) carrying the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchingPermission {
    pub id: RecordId,
    pub module_name: String,
    pub permission_name: String,
    pub flags: Capabilities,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    InvalidToken,
    LookupFailed,
    EmptyRequirement,
    NoRoles,
    NoMatchingPermission,
    MissingCapabilities,
}

impl AuthorizationExplanation {
    fn denied(
        user_id: UserId,
        key: &PermissionKey,
        required: Capabilities,
        kind: DenialKind,
        message: String,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            user_id,
            permission: key.clone(),
            required,
            granted: false,
            reason: message.clone(),
            roles: Vec::new(),
            matching_permissions: Vec::new(),
            effective: Capabilities::NONE,
            missing: required,
            denial_reason: Some(DenialReason {
                kind,
                message,
                suggestions,
            }),
        }
    }
}

/// Decide from already-resolved data: the user's role names and the active
/// rows their roles link to (rows for other keys are ignored).
pub fn explain_grants(
    user_id: UserId,
    key: &PermissionKey,
    required: Capabilities,
    roles: Vec<String>,
    rows: &[ModulePermission],
) -> AuthorizationExplanation {
    let matching: Vec<MatchingPermission> = rows
        .iter()
        .filter(|p| &p.internal_permission_name == key && p.is_active)
        .map(|p| MatchingPermission {
            id: p.id,
            module_name: p.module_name.clone(),
            permission_name: p.permission_name.clone(),
            flags: p.flags,
        })
        .collect();
    let effective = matching
        .iter()
        .fold(Capabilities::NONE, |acc, p| acc | p.flags);
    let missing = effective.missing(required);

    let denial = if required.is_empty() {
        Some(DenialReason {
            kind: DenialKind::EmptyRequirement,
            message: "No capability was requested".to_string(),
            suggestions: Vec::new(),
        })
    } else if roles.is_empty() {
        Some(DenialReason {
            kind: DenialKind::NoRoles,
            message: format!("User {user_id} holds no roles"),
            suggestions: vec![format!("Assign a role that is linked to '{key}'")],
        })
    } else if matching.is_empty() {
        Some(DenialReason {
            kind: DenialKind::NoMatchingPermission,
            message: format!("None of the user's roles link an active '{key}' permission"),
            suggestions: vec![
                format!("Grant '{key}' to one of: {}", roles.join(", ")),
                format!("Check whether '{key}' was deactivated"),
            ],
        })
    } else if !missing.is_empty() {
        Some(DenialReason {
            kind: DenialKind::MissingCapabilities,
            message: format!("Missing {missing} on '{key}'"),
            suggestions: vec![format!("Grant a '{key}' permission carrying {missing}")],
        })
    } else {
        None
    };

    let reason = match &denial {
        Some(d) => d.message.clone(),
        None => format!(
            "'{key}' grants {effective} through {} active permission(s)",
            matching.len()
        ),
    };

    AuthorizationExplanation {
        user_id,
        permission: key.clone(),
        required,
        granted: denial.is_none(),
        reason,
        roles,
        matching_permissions: matching,
        effective,
        missing,
        denial_reason: denial,
    }
}
