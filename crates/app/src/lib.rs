//! `kosmos-app`: wires every business module to one permission registry.

pub mod bootstrap;
pub mod services;

pub use bootstrap::{
    Bootstrapped, PermissionEntry, RegistrySnapshot, RoleEntry, bootstrap, bootstrap_at,
};
pub use services::{AppServices, Checker, Store};
