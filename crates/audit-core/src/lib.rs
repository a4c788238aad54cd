//! # audit-core
//!
//! Domain layer for deletion auditing: log entries, the acting user, SQL
//! identifiers, audit settings and the repository traits implemented by
//! `audit-db`. This crate has zero dependencies on infrastructure.

pub mod entities;
pub mod error;
pub mod settings;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AuditedTable, CoverageReport, DeletionLogEntry, DeletionLogQuery, InstallReport, SkipReason,
    TableOutcome, TableReport,
};
pub use error::DomainError;
pub use settings::AuditSettings;
pub use traits::{DeletionLogRepository, RepoResult, TriggerInstaller};
pub use value_objects::{
    quote_literal, Actor, Identifier, SettingName, TablePattern, TriggerName, ANONYMOUS_ACTOR_ID,
};
