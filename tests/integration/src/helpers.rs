//! Test helpers for integration tests
//!
//! Every test gets its own schema holding the log table, the audit function
//! and the fixture tables, so tests never observe each other's triggers.

use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use chrono::{DateTime, Utc};
use audit_common::AppConfig;
use audit_core::{
    Actor, AuditSettings, DeletionLogEntry, DeletionLogQuery, DeletionLogRepository,
    InstallReport, TriggerInstaller,
};
use audit_db::{
    bootstrap, create_pool, PgAuditedDeleter, PgDeletionLogRepository, PgPool,
    PgTriggerInstaller, TableRef,
};

/// Counter for unique schema names
static SCHEMA_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Load test configuration from the environment
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    Ok(config)
}

/// Helper to check if test environment is available
pub fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    true
}

/// A throwaway schema with its own audit settings
pub struct TestSchema {
    pub pool: PgPool,
    pub settings: AuditSettings,
}

impl TestSchema {
    /// Create an empty, uniquely named schema
    pub async fn create() -> Result<Self> {
        let config = test_config()?;
        let pool = create_pool(&config.database).await?;

        let name = format!(
            "audit_it_{}_{}",
            std::process::id(),
            SCHEMA_COUNTER.fetch_add(1, Ordering::SeqCst)
        );
        let settings = config.audit.settings()?.for_schema(&name)?;

        let schema = Self { pool, settings };
        schema
            .exec(&format!("CREATE SCHEMA {}", schema.settings.schema.quoted()))
            .await?;
        Ok(schema)
    }

    /// Quoted schema name, for use in fixture SQL
    pub fn name(&self) -> String {
        self.settings.schema.quoted()
    }

    /// Run one or more raw statements
    pub async fn exec(&self, sql: &str) -> Result<()> {
        sqlx::raw_sql(sql).execute(&self.pool).await?;
        Ok(())
    }

    pub fn table(&self, name: &str) -> Result<TableRef> {
        Ok(TableRef::new(self.settings.schema.as_str(), name)?)
    }

    pub fn installer(&self) -> PgTriggerInstaller {
        PgTriggerInstaller::new(self.pool.clone(), self.settings.clone())
    }

    pub fn deleter(&self) -> PgAuditedDeleter {
        PgAuditedDeleter::new(self.pool.clone(), self.settings.clone())
    }

    pub fn log(&self) -> PgDeletionLogRepository {
        PgDeletionLogRepository::new(self.pool.clone(), &self.settings)
    }

    /// Log table, audit function and triggers
    pub async fn bootstrap(&self) -> Result<InstallReport> {
        Ok(bootstrap(&self.pool, &self.settings).await?)
    }

    /// Re-run trigger installation only
    pub async fn install(&self) -> Result<InstallReport> {
        Ok(self.installer().install().await?)
    }

    /// Delete as `actor` through an audited transaction
    pub async fn delete_as(&self, actor: Actor, table: &str, id: i64) -> Result<u64> {
        Ok(self.deleter().delete(actor, &self.table(table)?, id).await?)
    }

    /// Delete with the actor setting holding an arbitrary raw value, or unset
    pub async fn delete_with_setting(
        &self,
        setting: Option<&str>,
        table: &str,
        id: i64,
    ) -> Result<u64> {
        let table = self.table(table)?;
        let mut tx = self.pool.begin().await?;

        if let Some(value) = setting {
            sqlx::query("SELECT set_config($1, $2, true)")
                .bind(self.settings.actor_setting.as_str())
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table.qualified()))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }

    /// Log entries for one table, newest first
    pub async fn entries_for(&self, table: &str) -> Result<Vec<DeletionLogEntry>> {
        Ok(self
            .log()
            .list(&DeletionLogQuery::new().table(table).limit(500))
            .await?)
    }

    /// Total number of rows in the log table
    pub async fn log_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM {}",
            self.settings.qualified_log_table()
        ))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Wall-clock time on the server, outside any transaction
    pub async fn server_clock(&self) -> Result<DateTime<Utc>> {
        let now = sqlx::query_scalar::<_, DateTime<Utc>>("SELECT clock_timestamp()")
            .fetch_one(&self.pool)
            .await?;
        Ok(now)
    }

    pub async fn row_exists(&self, table: &str, id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            self.table(table)?.qualified()
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Names of all user triggers on `table`
    pub async fn triggers_on(&self, table: &str) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r"
            SELECT t.tgname::text
            FROM pg_catalog.pg_trigger t
            JOIN pg_catalog.pg_class c ON c.oid = t.tgrelid
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            WHERE NOT t.tgisinternal AND n.nspname = $1 AND c.relname = $2
            ORDER BY t.tgname
            ",
        )
        .bind(self.settings.schema.as_str())
        .bind(table)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Drop the schema and everything in it
    pub async fn cleanup(self) -> Result<()> {
        self.exec(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name()))
            .await?;
        self.pool.close().await;
        Ok(())
    }
}
