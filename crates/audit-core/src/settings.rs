//! Audit settings - where the log lives and which tables are covered

use crate::entities::{AuditedTable, SkipReason};
use crate::error::DomainError;
use crate::value_objects::{Identifier, SettingName, TablePattern};

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_LOG_TABLE: &str = "deletion_log";
pub const DEFAULT_FUNCTION: &str = "deletion_log_trigger";

/// Names and filters shared by the schema bootstrap, the installer and audited deletes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSettings {
    /// Schema whose tables are audited; the log table lives here too
    pub schema: Identifier,
    pub log_table: Identifier,
    pub function: Identifier,
    pub actor_setting: SettingName,
    pub excluded: Vec<TablePattern>,
}

impl AuditSettings {
    pub fn new(
        schema: &str,
        log_table: &str,
        function: &str,
        actor_setting: &str,
        excluded: Vec<TablePattern>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            schema: Identifier::new(schema)?,
            log_table: Identifier::new(log_table)?,
            function: Identifier::new(function)?,
            actor_setting: SettingName::new(actor_setting)?,
            excluded,
        })
    }

    /// Same settings pointed at another schema
    pub fn for_schema(&self, schema: &str) -> Result<Self, DomainError> {
        Ok(Self {
            schema: Identifier::new(schema)?,
            ..self.clone()
        })
    }

    /// Quoted `"schema"."log_table"`
    pub fn qualified_log_table(&self) -> String {
        Identifier::qualified(&self.schema, &self.log_table)
    }

    /// Quoted `"schema"."function"`
    pub fn qualified_function(&self) -> String {
        Identifier::qualified(&self.schema, &self.function)
    }

    pub fn is_log_table(&self, table: &str) -> bool {
        table == self.log_table.as_str()
    }

    /// First exclusion pattern matching `table`
    pub fn excluded_by(&self, table: &str) -> Option<&TablePattern> {
        self.excluded.iter().find(|p| p.matches(table))
    }

    /// Decide whether a catalog table gets an audit trigger.
    ///
    /// `None` means eligible; otherwise the reason it is skipped.
    pub fn classify(&self, table: &AuditedTable) -> Option<SkipReason> {
        if self.is_log_table(&table.name) {
            return Some(SkipReason::LogTable);
        }
        if let Some(pattern) = self.excluded_by(&table.name) {
            return Some(SkipReason::ExcludedByPattern(pattern.to_string()));
        }
        match (&table.key_column, &table.key_type) {
            (None, _) | (_, None) => Some(SkipReason::NoSingleColumnKey),
            (Some(_), Some(key_type)) if !table.has_integer_key() => {
                Some(SkipReason::NonIntegerKey(key_type.clone()))
            }
            _ => None,
        }
    }
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            schema: Identifier::from_static(DEFAULT_SCHEMA),
            log_table: Identifier::from_static(DEFAULT_LOG_TABLE),
            function: Identifier::from_static(DEFAULT_FUNCTION),
            actor_setting: SettingName::default(),
            excluded: TablePattern::defaults(),
        }
    }
}
