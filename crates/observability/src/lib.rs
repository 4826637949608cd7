//! Process-wide logging setup.

pub mod tracing;

pub use crate::tracing::{DEFAULT_FILTER, LogFormat};

/// JSON logs to stderr, filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops and return `false`.
pub fn init() -> bool {
    crate::tracing::init(LogFormat::from_env())
}
