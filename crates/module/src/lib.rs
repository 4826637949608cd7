//! `kosmos-module`: the CRUD template every business module is built from.
//!
//! A module supplies a [`ModuleDefinition`]; [`ErpModule`] turns it into the
//! Get / Find / Create / Edit / Delete operations with validation, permission
//! checks, audit stamping and soft delete.

pub mod definition;
pub mod lines;
pub mod patch;
pub mod seeding;
pub mod service;
pub mod store;

pub use definition::{
    DeleteCommand, FindCommand, ModuleCommand, ModuleDefinition, TargetsRecord, exact_matches,
    wildcard_matches,
};
pub use lines::{
    Line, LineChange, MAX_LINE_NUMBER, apply_line_changes, assign_line_number,
    check_distinct_line_numbers, check_line_number, check_line_numbers, next_line_id,
};
pub use patch::{patch, patch_opt, patch_opt_text, patch_text};
pub use seeding::SeedPermissions;
pub use service::{DEFAULT_MAX_PAGE_SIZE, ErpModule, ModuleError, PagingLimits};
pub use store::{InMemoryRecordStore, RecordStore, StoreError};
