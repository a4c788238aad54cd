//! Schema bootstrap: deletion log table, its append-only guard, the audit
//! function and the per-table triggers
//!
//! Every step is idempotent, so `bootstrap` is safe to run on each start-up
//! and after schema changes to pick up new tables.

use sqlx::PgPool;
use tracing::{info, instrument};

use audit_core::{AuditSettings, InstallReport, RepoResult, TriggerInstaller};

use crate::installer::PgTriggerInstaller;
use crate::repositories::map_db_error;
use crate::sql;

/// Create the schema, log table, indexes and append-only guard if missing
#[instrument(skip(pool, settings), fields(log_table = %settings.qualified_log_table()))]
pub async fn ensure_log_table(pool: &PgPool, settings: &AuditSettings) -> RepoResult<()> {
    let mut statements = vec![sql::create_schema_sql(settings), sql::log_table_ddl(settings)];
    statements.extend(sql::log_index_ddl(settings));
    statements.extend(sql::append_only_guard_ddl(settings)?);

    let mut tx = pool.begin().await.map_err(map_db_error)?;
    for stmt in &statements {
        sqlx::query(stmt)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
    }
    tx.commit().await.map_err(map_db_error)?;

    info!("Deletion log table ready");
    Ok(())
}

/// Full start-up sequence: log table, audit function, then triggers
#[instrument(skip(pool, settings), fields(schema = %settings.schema))]
pub async fn bootstrap(pool: &PgPool, settings: &AuditSettings) -> RepoResult<InstallReport> {
    ensure_log_table(pool, settings).await?;

    let installer = PgTriggerInstaller::new(pool.clone(), settings.clone());
    installer.install_function().await?;
    installer.install().await
}
