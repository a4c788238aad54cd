//! Repository traits (ports) - define the interface for audit storage and installation
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;

use crate::entities::{CoverageReport, DeletionLogEntry, DeletionLogQuery, InstallReport};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Deletion Log Repository
// ============================================================================

/// Read access to the deletion log.
///
/// Entries are written only by the database trigger. No create, update or
/// delete operation exists.
#[async_trait]
pub trait DeletionLogRepository: Send + Sync {
    /// Find an entry by its log id
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<DeletionLogEntry>>;

    /// All entries for one deleted record, newest first
    async fn find_by_record(&self, table_name: &str, record_id: i64)
        -> RepoResult<Vec<DeletionLogEntry>>;

    /// List entries matching a query, newest first
    async fn list(&self, query: &DeletionLogQuery) -> RepoResult<Vec<DeletionLogEntry>>;

    /// Number of entries per table, largest first
    async fn count_by_table(&self) -> RepoResult<Vec<(String, i64)>>;
}

// ============================================================================
// Trigger Installer
// ============================================================================

/// Attaches the audit function to every eligible table of a schema
#[async_trait]
pub trait TriggerInstaller: Send + Sync {
    /// Create or replace the audit trigger function
    async fn install_function(&self) -> RepoResult<()>;

    /// (Re)install triggers on every eligible table.
    ///
    /// Per-table failures are reported in the returned [`InstallReport`];
    /// an `Err` means the run could not start (e.g. the catalog read failed).
    async fn install(&self) -> RepoResult<InstallReport>;

    /// Compare eligible tables with the triggers present
    async fn status(&self) -> RepoResult<CoverageReport>;

    /// Remove every trigger bound to the audit function, returning how many were dropped
    async fn uninstall(&self, drop_function: bool) -> RepoResult<usize>;
}
