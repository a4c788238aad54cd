//! Deletion log database model

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

use audit_core::{Actor, DeletionLogEntry};

/// Database model for the deletion log table
#[derive(Debug, Clone, FromRow)]
pub struct DeletionLogModel {
    pub id: i64,
    /// Acting user id, `-1` when unknown
    pub deleted_by: i32,
    pub table_name: String,
    pub record_id: i64,
    /// `to_jsonb(OLD)` snapshot
    pub record_data: JsonValue,
    pub deleted_at: DateTime<Utc>,
}

impl From<DeletionLogModel> for DeletionLogEntry {
    fn from(model: DeletionLogModel) -> Self {
        DeletionLogEntry {
            id: model.id,
            deleted_by: Actor::from_id(model.deleted_by),
            table_name: model.table_name,
            record_id: model.record_id,
            record_data: model.record_data,
            deleted_at: model.deleted_at,
        }
    }
}
