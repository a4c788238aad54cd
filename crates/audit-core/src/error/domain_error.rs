//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Deletion log entry not found: {0}")]
    EntryNotFound(i64),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid table pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid session setting: {0}")]
    InvalidSetting(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    /// Get an error code string for reports and logs
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::EntryNotFound(_) => "UNKNOWN_ENTRY",
            Self::TableNotFound(_) => "UNKNOWN_TABLE",

            // Validation
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Self::InvalidPattern(_) => "INVALID_PATTERN",
            Self::InvalidSetting(_) => "INVALID_SETTING",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntryNotFound(_) | Self::TableNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier(_) | Self::InvalidPattern(_) | Self::InvalidSetting(_)
        )
    }
}
