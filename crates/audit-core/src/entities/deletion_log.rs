//! Deletion log entry - one row per deleted record, append-only

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::value_objects::Actor;

/// Default page size for log listings
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Upper bound for a single log listing
pub const MAX_PAGE_SIZE: i64 = 500;

/// A single audited delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionLogEntry {
    pub id: i64,
    pub deleted_by: Actor,
    pub table_name: String,
    pub record_id: i64,
    /// Snapshot of the row as it was immediately before the delete
    pub record_data: JsonValue,
    pub deleted_at: DateTime<Utc>,
}

impl DeletionLogEntry {
    /// Read a column out of the row snapshot
    pub fn field(&self, column: &str) -> Option<&JsonValue> {
        self.record_data.get(column)
    }
}

/// Filters for listing the deletion log, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionLogQuery {
    pub table_name: Option<String>,
    pub deleted_by: Option<Actor>,
    pub record_id: Option<i64>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// Keyset cursor: only entries with `id < before_id`
    pub before_id: Option<i64>,
    pub limit: Option<i64>,
}

impl DeletionLogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn actor(mut self, actor: Actor) -> Self {
        self.deleted_by = Some(actor);
        self
    }

    pub fn record(mut self, record_id: i64) -> Self {
        self.record_id = Some(record_id);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn before(mut self, id: i64) -> Self {
        self.before_id = Some(id);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Requested limit clamped to `1..=MAX_PAGE_SIZE`
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}
