//! Domain error model.

use thiserror::Error;

use crate::response::ResultCode;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing records, permission denials). Storage concerns have their own
/// error types and are folded into [`ResultCode::Error`] at the envelope.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more fields failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A record with the same natural key already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The command body was missing.
    #[error("null item input")]
    NullItemInput,

    /// The caller lacks the capability required for the operation.
    #[error("Invalid permission")]
    InvalidPermission,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    /// Result code carried in the response envelope for this error.
    pub fn result_code(&self) -> ResultCode {
        match self {
            DomainError::Validation(_) | DomainError::InvalidId(_) => ResultCode::DataValidationError,
            DomainError::NotFound(_) => ResultCode::NotFound,
            DomainError::AlreadyExists(_) => ResultCode::AlreadyExists,
            DomainError::NullItemInput => ResultCode::NullItemInput,
            DomainError::InvalidPermission => ResultCode::InvalidPermission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_record() {
        assert_eq!(DomainError::not_found("Lead").to_string(), "Lead not found");
    }

    #[test]
    fn errors_map_to_envelope_codes() {
        assert_eq!(
            DomainError::validation("x").result_code(),
            ResultCode::DataValidationError
        );
        assert_eq!(DomainError::InvalidPermission.result_code(), ResultCode::InvalidPermission);
        assert_eq!(DomainError::already_exists("x").result_code(), ResultCode::AlreadyExists);
        assert_eq!(DomainError::NullItemInput.result_code(), ResultCode::NullItemInput);
    }
}
