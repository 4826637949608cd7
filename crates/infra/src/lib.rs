//! Infrastructure layer: configuration and the startup module registry.

pub mod config;
pub mod registry;

pub use config::{AppConfig, ConfigError, DEV_JWT_SECRET};
pub use registry::{ModuleRegistry, SeedOutcome, SeedSummary};
