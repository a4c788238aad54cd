//! PostgreSQL implementation of TriggerInstaller
//!
//! Every eligible table of the audited schema gets exactly one
//! `BEFORE DELETE ... FOR EACH ROW` trigger bound to the audit function.
//! Each table is handled in its own transaction: a failure on one table is
//! recorded in the report and the run moves on to the next.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{error, info, instrument, warn};

use audit_core::{
    AuditSettings, AuditedTable, CoverageReport, Identifier, InstallReport, RepoResult,
    SkipReason, TableOutcome, TableReport, TriggerInstaller, TriggerName,
};
use sqlx::PgPool;

use crate::catalog;
use crate::models::CatalogTriggerModel;
use crate::repositories::map_db_error;
use crate::sql;

/// Installs and inspects audit triggers for one schema
#[derive(Clone)]
pub struct PgTriggerInstaller {
    pool: PgPool,
    settings: AuditSettings,
}

/// Audit triggers currently present, grouped by table
type TriggersByTable = BTreeMap<String, Vec<CatalogTriggerModel>>;

impl PgTriggerInstaller {
    /// Create a new PgTriggerInstaller
    pub fn new(pool: PgPool, settings: AuditSettings) -> Self {
        Self { pool, settings }
    }

    pub fn settings(&self) -> &AuditSettings {
        &self.settings
    }

    /// Classify every table in the schema without touching anything
    #[instrument(skip(self), fields(schema = %self.settings.schema))]
    pub async fn plan(&self) -> RepoResult<Vec<(AuditedTable, Option<SkipReason>)>> {
        let tables = catalog::list_tables(&self.pool, self.settings.schema.as_str()).await?;
        Ok(tables
            .into_iter()
            .map(|table| {
                let skip = self.settings.classify(&table);
                (table, skip)
            })
            .collect())
    }

    async fn triggers_by_table(&self) -> RepoResult<TriggersByTable> {
        let mut grouped = TriggersByTable::new();
        for trigger in catalog::list_audit_triggers(&self.pool, &self.settings).await? {
            grouped
                .entry(trigger.table_name.clone())
                .or_default()
                .push(trigger);
        }
        Ok(grouped)
    }

    /// Replace whatever audit triggers `table` has with the single expected one.
    ///
    /// Runs in one transaction so the table is never observed without a trigger.
    /// Statements go through `sqlx::query` so the future stays `Send`.
    /// Returns the names of differently-named triggers that were removed.
    async fn install_table(
        &self,
        table: &AuditedTable,
        existing: &[CatalogTriggerModel],
    ) -> RepoResult<Vec<String>> {
        let name = Identifier::new(table.name.as_str())?;
        let key_column = Identifier::new(table.key_column.as_deref().unwrap_or("id"))?;
        let trigger = TriggerName::for_table(&name);

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let mut removed = Vec::new();

        for other in existing.iter().filter(|t| !trigger.matches(&t.trigger_name)) {
            let other_name = Identifier::new(other.trigger_name.as_str())?;
            let stmt = sql::drop_trigger_sql(&other_name, &self.settings.schema, &name);
            sqlx::query(&stmt)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            removed.push(other.trigger_name.clone());
        }

        let drop = sql::drop_trigger_sql(trigger.as_identifier(), &self.settings.schema, &name);
        sqlx::query(&drop)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let create = sql::create_trigger_sql(&self.settings, &trigger, &name, &key_column);
        sqlx::query(&create)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(removed)
    }

    /// Drop audit triggers from a table that should not carry any
    async fn remove_triggers(
        &self,
        table: &str,
        existing: &[CatalogTriggerModel],
    ) -> RepoResult<Vec<String>> {
        let name = Identifier::new(table)?;
        let mut removed = Vec::with_capacity(existing.len());

        for trigger in existing {
            let trigger_name = Identifier::new(trigger.trigger_name.as_str())?;
            let stmt = sql::drop_trigger_sql(&trigger_name, &self.settings.schema, &name);
            sqlx::raw_sql(&stmt)
                .execute(&self.pool)
                .await
                .map_err(map_db_error)?;
            removed.push(trigger.trigger_name.clone());
        }

        Ok(removed)
    }
}

#[async_trait]
impl TriggerInstaller for PgTriggerInstaller {
    #[instrument(skip(self), fields(function = %self.settings.qualified_function()))]
    async fn install_function(&self) -> RepoResult<()> {
        let ddl = sql::audit_function_ddl(&self.settings)?;
        sqlx::raw_sql(&ddl)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        info!("Audit function installed");
        Ok(())
    }

    #[instrument(skip(self), fields(schema = %self.settings.schema))]
    async fn install(&self) -> RepoResult<InstallReport> {
        let mut existing = self.triggers_by_table().await?;
        let mut report = InstallReport::new(self.settings.schema.as_str());

        for (table, skip) in self.plan().await? {
            let current = existing.remove(&table.name).unwrap_or_default();

            let outcome = match skip {
                Some(reason) => {
                    if !current.is_empty() {
                        match self.remove_triggers(&table.name, &current).await {
                            Ok(removed) => {
                                info!(table = %table.name, ?removed, "Removed triggers from ineligible table");
                                report.removed_stale.extend(removed);
                            }
                            Err(e) => {
                                error!(table = %table.name, error = %e, "Failed to remove stale trigger");
                                report.record(
                                    table.name.clone(),
                                    TableOutcome::Failed {
                                        error: e.to_string(),
                                    },
                                );
                                continue;
                            }
                        }
                    }
                    if matches!(
                        reason,
                        SkipReason::NoSingleColumnKey | SkipReason::NonIntegerKey(_)
                    ) {
                        warn!(table = %table.name, reason = %reason, "Table left unaudited");
                    }
                    TableOutcome::Skipped { reason }
                }
                None => match self.install_table(&table, &current).await {
                    Ok(removed) => {
                        info!(table = %table.name, "Audit trigger installed");
                        report.removed_stale.extend(removed);
                        TableOutcome::Installed
                    }
                    Err(e) => {
                        error!(table = %table.name, error = %e, "Audit trigger installation failed");
                        TableOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                },
            };

            report.record(table.name, outcome);
        }

        info!(
            installed = report.installed().count(),
            skipped = report.skipped().count(),
            failed = report.failed().count(),
            "Trigger installation finished"
        );
        Ok(report)
    }

    #[instrument(skip(self), fields(schema = %self.settings.schema))]
    async fn status(&self) -> RepoResult<CoverageReport> {
        let mut existing = self.triggers_by_table().await?;
        let mut report = CoverageReport {
            schema: self.settings.schema.to_string(),
            ..CoverageReport::default()
        };

        for (table, skip) in self.plan().await? {
            let current = existing.remove(&table.name).unwrap_or_default();

            match skip {
                Some(reason) => {
                    report.stale.extend(
                        current
                            .into_iter()
                            .map(|t| (table.name.clone(), t.trigger_name)),
                    );
                    report.skipped.push(TableReport {
                        table: table.name,
                        outcome: TableOutcome::Skipped { reason },
                    });
                }
                None => {
                    let expected = TriggerName::for_table(&Identifier::new(table.name.as_str())?);
                    let mut covered = false;
                    for trigger in current {
                        if expected.matches(&trigger.trigger_name) && trigger.before_row_delete {
                            covered = true;
                        } else {
                            report.stale.push((table.name.clone(), trigger.trigger_name));
                        }
                    }
                    if covered {
                        report.covered.push(table.name);
                    } else {
                        report.missing.push(table.name);
                    }
                }
            }
        }

        Ok(report)
    }

    #[instrument(skip(self), fields(schema = %self.settings.schema))]
    async fn uninstall(&self, drop_function: bool) -> RepoResult<usize> {
        let mut dropped = 0;
        for (table, triggers) in self.triggers_by_table().await? {
            dropped += self.remove_triggers(&table, &triggers).await?.len();
        }

        if drop_function {
            sqlx::raw_sql(&sql::drop_function_sql(&self.settings))
                .execute(&self.pool)
                .await
                .map_err(map_db_error)?;
        }

        info!(dropped, drop_function, "Audit triggers removed");
        Ok(dropped)
    }
}
