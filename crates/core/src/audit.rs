//! Audit columns shared by every persisted record, and their DTO rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::{RecordId, UserId};

/// Timestamps are stored in UTC, so every rendered offset is zero.
pub const UTC_OFFSET: &str = "+00:00";

/// Who created/updated/deleted a record and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    pub is_deleted: bool,
    pub created_on: DateTime<Utc>,
    pub created_by: UserId,
    pub updated_on: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
    pub deleted_on: Option<DateTime<Utc>>,
    pub deleted_by: Option<UserId>,
    pub guid: Uuid,
}

impl AuditFields {
    /// Audit fields for a freshly created record.
    pub fn fill_common(user: UserId, now: DateTime<Utc>) -> Self {
        Self {
            is_deleted: false,
            created_on: now,
            created_by: user,
            updated_on: Some(now),
            updated_by: Some(user),
            deleted_on: None,
            deleted_by: None,
            guid: Uuid::new_v4(),
        }
    }

    pub fn fill_update(&mut self, user: UserId, now: DateTime<Utc>) {
        self.updated_on = Some(now);
        self.updated_by = Some(user);
    }

    /// Soft delete: the row stays, flagged and stamped.
    pub fn fill_delete(&mut self, user: UserId, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_on = Some(now);
        self.deleted_by = Some(user);
        self.fill_update(user, now);
    }
}

/// `YYYY-MM-DD HH:MM:SSZ`, the universal sortable form.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%SZ").to_string()
}

/// Audit section of every DTO (flattened into the DTO body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDto {
    pub id: RecordId,
    pub is_deleted: bool,
    pub created_on: DateTime<Utc>,
    pub created_by: UserId,
    pub created_on_string: String,
    pub created_on_timezone: String,
    pub updated_on: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
    pub updated_on_string: Option<String>,
    pub updated_on_timezone: Option<String>,
    pub deleted_on: Option<DateTime<Utc>>,
    pub deleted_by: Option<UserId>,
    pub deleted_on_string: Option<String>,
    pub deleted_on_timezone: Option<String>,
    pub guid: String,
}

impl AuditDto {
    pub fn new(id: RecordId, audit: &AuditFields) -> Self {
        Self {
            id,
            is_deleted: audit.is_deleted,
            created_on: audit.created_on,
            created_by: audit.created_by,
            created_on_string: format_timestamp(audit.created_on),
            created_on_timezone: UTC_OFFSET.to_string(),
            updated_on: audit.updated_on,
            updated_by: audit.updated_by,
            updated_on_string: audit.updated_on.map(format_timestamp),
            updated_on_timezone: audit.updated_on.map(|_| UTC_OFFSET.to_string()),
            deleted_on: audit.deleted_on,
            deleted_by: audit.deleted_by,
            deleted_on_string: audit.deleted_on.map(format_timestamp),
            deleted_on_timezone: audit.deleted_on.map(|_| UTC_OFFSET.to_string()),
            guid: audit.guid.to_string(),
        }
    }
}
