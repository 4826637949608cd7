//! Uniform result envelopes returned by every module operation.
//!
//! Failures travel inside the envelope as a [`ResultCode`] plus message; they
//! are never raised to the caller's transport layer.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultCode {
    Success,
    NotFound,
    InvalidPermission,
    DataValidationError,
    AlreadyExists,
    Error,
    NullItemInput,
}

/// Single-item envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    pub success: bool,
    pub result_code: ResultCode,
    pub exception: Option<String>,
    pub data: Option<T>,
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            result_code: ResultCode::Success,
            exception: None,
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>, code: ResultCode) -> Self {
        Self {
            success: false,
            result_code: code,
            exception: Some(message.into()),
            data: None,
        }
    }

    pub fn into_result(self) -> Result<T, (ResultCode, Option<String>)> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err((self.result_code, self.exception)),
        }
    }
}

impl<T> From<DomainError> for Response<T> {
    fn from(err: DomainError) -> Self {
        Self::error(err.to_string(), err.result_code())
    }
}

/// Paged list envelope; `total_result_count` counts all matches, not the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagingResult<T> {
    pub success: bool,
    pub result_code: ResultCode,
    pub exception: Option<String>,
    pub data: Vec<T>,
    pub total_result_count: usize,
}

impl<T> PagingResult<T> {
    pub fn ok(data: Vec<T>, total_result_count: usize) -> Self {
        Self {
            success: true,
            result_code: ResultCode::Success,
            exception: None,
            data,
            total_result_count,
        }
    }

    pub fn error(message: impl Into<String>, code: ResultCode) -> Self {
        Self {
            success: false,
            result_code: code,
            exception: Some(message.into()),
            data: Vec::new(),
            total_result_count: 0,
        }
    }
}

impl<T> From<DomainError> for PagingResult<T> {
    fn from(err: DomainError) -> Self {
        Self::error(err.to_string(), err.result_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_serializes_without_data() {
        let resp: Response<u32> = Response::error("Lead not found", ResultCode::NotFound);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["result_code"], "NotFound");
        assert_eq!(json["exception"], "Lead not found");
        assert!(json["data"].is_null());
    }

    #[test]
    fn paging_error_has_zero_count() {
        let resp: PagingResult<u32> = DomainError::InvalidPermission.into();
        assert!(!resp.success);
        assert_eq!(resp.result_code, ResultCode::InvalidPermission);
        assert_eq!(resp.total_result_count, 0);
        assert!(resp.data.is_empty());
    }
}
