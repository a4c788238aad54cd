//! Error handling utilities for repositories

use audit_core::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Create an "entry not found" error
pub fn entry_not_found(id: i64) -> DomainError {
    DomainError::EntryNotFound(id)
}

/// Create a "table not found" error
pub fn table_not_found(schema: &str, table: &str) -> DomainError {
    DomainError::TableNotFound(format!("{schema}.{table}"))
}
