//! Domain entities - deletion log entries and installer reports

mod deletion_log;
mod install;

pub use deletion_log::{DeletionLogEntry, DeletionLogQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use install::{
    AuditedTable, CoverageReport, InstallReport, SkipReason, TableOutcome, TableReport,
    INTEGER_KEY_TYPES,
};
