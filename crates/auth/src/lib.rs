//! `kosmos-auth`: role-based permission registry, seeding and checks.
//!
//! This crate is decoupled from transport and persistence: storage is reached
//! through [`PermissionRepository`], tokens through [`TokenValidator`].

pub mod admin;
pub mod authorize;
pub mod capability;
pub mod claims;
pub mod in_memory;
pub mod permissions;
pub mod principal;
pub mod repository;
pub mod roles;
pub mod seed;

pub use admin::{AdminError, assign_role, grant_permission, revoke_role, set_permission_active};
pub use authorize::{
    AuthorizationExplanation, Authorizer, DenialKind, DenialReason, MatchingPermission,
    PermissionChecker, explain_grants,
};
pub use capability::{Capabilities, Capability};
pub use claims::{Hs256TokenValidator, JwtClaims, TokenValidationError, TokenValidator, validate_claims};
pub use in_memory::InMemoryPermissionRepository;
pub use permissions::{
    ModulePermission, ModulePermissionSet, PermissionDefinition, PermissionKey, RolePermission,
};
pub use principal::Caller;
pub use repository::{PermissionRepository, RepositoryError};
pub use roles::{Role, RoleName, UserRole};
pub use seed::{SeedError, SeedReport, seed_module_permissions};
