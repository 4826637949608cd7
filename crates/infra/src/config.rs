//! Configuration loading and representation.
//!
//! Everything comes from `KOSMOS_*` environment variables; unset variables
//! fall back to development defaults, malformed ones are errors.

use thiserror::Error;
use tracing::warn;

use kosmos_core::UserId;
use kosmos_core::paging::DEFAULT_PAGE_SIZE;
use kosmos_module::{DEFAULT_MAX_PAGE_SIZE, PagingLimits};

pub const JWT_SECRET_VAR: &str = "KOSMOS_JWT_SECRET";
pub const SEED_ACTOR_VAR: &str = "KOSMOS_SEED_ACTOR_ID";
pub const DEFAULT_PAGE_SIZE_VAR: &str = "KOSMOS_DEFAULT_PAGE_SIZE";
pub const MAX_PAGE_SIZE_VAR: &str = "KOSMOS_MAX_PAGE_SIZE";

/// Insecure secret used when none is configured.
pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    NotANumber { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    NotPositive { var: &'static str },

    #[error("default page size {default} exceeds max page size {max}")]
    PageSizeOrder { default: usize, max: usize },
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub jwt_secret: String,
    /// User recorded in the audit fields of seeded rows.
    pub seed_actor: UserId,
    pub paging: PagingLimits,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("seed_actor", &self.seed_actor)
            .field("paging", &self.paging)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            seed_actor: UserId::new(1),
            paging: PagingLimits::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = match lookup(JWT_SECRET_VAR).filter(|s| !s.trim().is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("{JWT_SECRET_VAR} not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let seed_actor = positive(&lookup, SEED_ACTOR_VAR)?
            .map(|id| i32::try_from(id).map_err(|_| ConfigError::NotANumber {
                var: SEED_ACTOR_VAR,
                value: id.to_string(),
            }))
            .transpose()?
            .map_or(UserId::new(1), UserId::new);

        let default_page_size = positive(&lookup, DEFAULT_PAGE_SIZE_VAR)?.unwrap_or(DEFAULT_PAGE_SIZE);
        let max_page_size = positive(&lookup, MAX_PAGE_SIZE_VAR)?.unwrap_or(DEFAULT_MAX_PAGE_SIZE);
        if default_page_size > max_page_size {
            return Err(ConfigError::PageSizeOrder {
                default: default_page_size,
                max: max_page_size,
            });
        }

        Ok(Self {
            jwt_secret,
            seed_actor,
            paging: PagingLimits {
                default_page_size,
                max_page_size,
            },
        })
    }
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<usize>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let value: usize = raw.trim().parse().map_err(|_| ConfigError::NotANumber {
        var,
        value: raw.clone(),
    })?;
    if value == 0 {
        return Err(ConfigError::NotPositive { var });
    }
    Ok(Some(value))
}
