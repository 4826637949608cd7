//! `kosmos-core`: shared building blocks for every ERP module.
//!
//! Pure data and helpers only: no storage, no authorization.

pub mod audit;
pub mod entity;
pub mod error;
pub mod id;
pub mod paging;
pub mod response;
pub mod validation;

pub use audit::{AuditDto, AuditFields};
pub use entity::{Entity, Record};
pub use error::{DomainError, DomainResult};
pub use id::{ModuleId, RecordId, UserId};
pub use paging::{PagingSortingParameters, SortOrder};
pub use response::{PagingResult, Response, ResultCode};
pub use validation::{Validate, Validator};
