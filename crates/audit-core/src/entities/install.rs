//! Trigger installation results and coverage reports

use serde::Serialize;
use std::fmt;

/// Column types the audit function can store in `record_id`
pub const INTEGER_KEY_TYPES: &[&str] = &["smallint", "integer", "bigint"];

/// A table as read from the schema catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditedTable {
    pub name: String,
    /// Column of a single-column primary key, if the table has one
    pub key_column: Option<String>,
    /// Type of that column as reported by the catalog (e.g. `integer`)
    pub key_type: Option<String>,
}

impl AuditedTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_column: None,
            key_type: None,
        }
    }

    pub fn with_key(mut self, column: impl Into<String>, key_type: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self.key_type = Some(key_type.into());
        self
    }

    pub fn has_integer_key(&self) -> bool {
        self.key_type
            .as_deref()
            .is_some_and(|t| INTEGER_KEY_TYPES.contains(&t))
    }
}

/// Why a table was left without an audit trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The deletion log itself is never audited
    LogTable,
    ExcludedByPattern(String),
    NoSingleColumnKey,
    NonIntegerKey(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogTable => write!(f, "deletion log table"),
            Self::ExcludedByPattern(p) => write!(f, "excluded by pattern {p}"),
            Self::NoSingleColumnKey => write!(f, "no single-column primary key"),
            Self::NonIntegerKey(t) => write!(f, "primary key is {t}, not an integer"),
        }
    }
}

/// Result of (re)installing the trigger on one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    Installed,
    Skipped { reason: SkipReason },
    Failed { error: String },
}

impl TableOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Per-table outcome of one installer run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub outcome: TableOutcome,
}

/// Summary of one installer run over a schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub schema: String,
    pub tables: Vec<TableReport>,
    /// Triggers removed from tables that are no longer eligible
    pub removed_stale: Vec<String>,
}

impl InstallReport {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, table: impl Into<String>, outcome: TableOutcome) {
        self.tables.push(TableReport {
            table: table.into(),
            outcome,
        });
    }

    pub fn installed(&self) -> impl Iterator<Item = &str> {
        self.tables
            .iter()
            .filter(|r| r.outcome == TableOutcome::Installed)
            .map(|r| r.table.as_str())
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.tables.iter().filter_map(|r| match &r.outcome {
            TableOutcome::Skipped { reason } => Some((r.table.as_str(), reason)),
            _ => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tables.iter().filter_map(|r| match &r.outcome {
            TableOutcome::Failed { error } => Some((r.table.as_str(), error.as_str())),
            _ => None,
        })
    }

    /// True when no table failed
    pub fn is_success(&self) -> bool {
        !self.tables.iter().any(|r| r.outcome.is_failed())
    }
}

/// Comparison of eligible tables against the triggers actually present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub schema: String,
    /// Eligible tables carrying exactly the expected trigger
    pub covered: Vec<String>,
    /// Eligible tables without the expected trigger
    pub missing: Vec<String>,
    /// `(table, trigger)` pairs bound to the audit function that should not exist
    pub stale: Vec<(String, String)>,
    pub skipped: Vec<TableReport>,
}

impl CoverageReport {
    /// True when every eligible table is covered and nothing else is
    pub fn is_converged(&self) -> bool {
        self.missing.is_empty() && self.stale.is_empty()
    }
}
