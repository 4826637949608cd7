//! Command validation helpers.

use crate::error::DomainError;

/// Implemented by commands that must be checked before any permission lookup
/// or mutation.
pub trait Validate {
    fn validate(&self) -> Result<(), DomainError>;
}

/// Collects every field failure so the caller sees all of them at once.
#[derive(Debug, Default)]
pub struct Validator {
    failures: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.failures.push(format!("{field} is required"));
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(v) = value {
            if v.chars().count() > max {
                self.failures
                    .push(format!("{field} must be at most {max} characters"));
            }
        }
        self
    }

    pub fn exact_len(&mut self, field: &str, value: &str, len: usize) -> &mut Self {
        if value.chars().count() != len {
            self.failures.push(format!("{field} must be exactly {len} characters"));
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: i64) -> &mut Self {
        if value <= 0 {
            self.failures.push(format!("{field} must be greater than zero"));
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: i64) -> &mut Self {
        if value < 0 {
            self.failures.push(format!("{field} must not be negative"));
        }
        self
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.failures.push(message.into());
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), DomainError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(self.failures.join("; ")))
        }
    }
}
