//! Rows read from the PostgreSQL system catalog

use sqlx::FromRow;

use audit_core::AuditedTable;

/// An ordinary table with its single-column primary key, if any
#[derive(Debug, Clone, FromRow)]
pub struct CatalogTableModel {
    pub name: String,
    pub key_column: Option<String>,
    pub key_type: Option<String>,
}

impl From<CatalogTableModel> for AuditedTable {
    fn from(model: CatalogTableModel) -> Self {
        AuditedTable {
            name: model.name,
            key_column: model.key_column,
            key_type: model.key_type,
        }
    }
}

/// A trigger bound to the audit function
#[derive(Debug, Clone, FromRow)]
pub struct CatalogTriggerModel {
    pub table_name: String,
    pub trigger_name: String,
    /// Fires `BEFORE DELETE ... FOR EACH ROW`
    pub before_row_delete: bool,
}
