//! PostgreSQL implementation of DeletionLogRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use audit_core::{
    AuditSettings, DeletionLogEntry, DeletionLogQuery, DeletionLogRepository, RepoResult,
};

use crate::models::DeletionLogModel;

use super::error::{entry_not_found, map_db_error};

const SELECT_COLUMNS: &str = "id, deleted_by, table_name, record_id, record_data, deleted_at";

/// PostgreSQL implementation of DeletionLogRepository
#[derive(Clone)]
pub struct PgDeletionLogRepository {
    pool: PgPool,
    /// Quoted, schema-qualified log table
    log_table: String,
}

impl PgDeletionLogRepository {
    /// Create a new PgDeletionLogRepository
    pub fn new(pool: PgPool, settings: &AuditSettings) -> Self {
        Self {
            pool,
            log_table: settings.qualified_log_table(),
        }
    }

    /// Find an entry by id, failing when it does not exist
    pub async fn get(&self, id: i64) -> RepoResult<DeletionLogEntry> {
        self.find_by_id(id).await?.ok_or_else(|| entry_not_found(id))
    }

    fn select(&self) -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new(format!(
            "SELECT {SELECT_COLUMNS} FROM {} WHERE TRUE",
            self.log_table
        ))
    }
}

/// Append the filters of `query` to a `... WHERE TRUE` builder
fn push_filters(builder: &mut QueryBuilder<'static, Postgres>, query: &DeletionLogQuery) {
    if let Some(table_name) = &query.table_name {
        builder.push(" AND table_name = ").push_bind(table_name.clone());
    }
    if let Some(actor) = query.deleted_by {
        builder.push(" AND deleted_by = ").push_bind(actor.id());
    }
    if let Some(record_id) = query.record_id {
        builder.push(" AND record_id = ").push_bind(record_id);
    }
    if let Some(since) = query.since {
        builder.push(" AND deleted_at >= ").push_bind(since);
    }
    if let Some(until) = query.until {
        builder.push(" AND deleted_at < ").push_bind(until);
    }
    if let Some(before_id) = query.before_id {
        builder.push(" AND id < ").push_bind(before_id);
    }
}

#[async_trait]
impl DeletionLogRepository for PgDeletionLogRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<DeletionLogEntry>> {
        let mut builder = self.select();
        builder.push(" AND id = ").push_bind(id);

        let result = builder
            .build_query_as::<DeletionLogModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(DeletionLogEntry::from))
    }

    #[instrument(skip(self))]
    async fn find_by_record(
        &self,
        table_name: &str,
        record_id: i64,
    ) -> RepoResult<Vec<DeletionLogEntry>> {
        let mut builder = self.select();
        builder
            .push(" AND table_name = ")
            .push_bind(table_name.to_string())
            .push(" AND record_id = ")
            .push_bind(record_id)
            .push(" ORDER BY id DESC");

        let results = builder
            .build_query_as::<DeletionLogModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(DeletionLogEntry::from).collect())
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &DeletionLogQuery) -> RepoResult<Vec<DeletionLogEntry>> {
        let mut builder = self.select();
        push_filters(&mut builder, query);
        builder
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(query.effective_limit());

        let results = builder
            .build_query_as::<DeletionLogModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(DeletionLogEntry::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_by_table(&self) -> RepoResult<Vec<(String, i64)>> {
        let sql = format!(
            "SELECT table_name, COUNT(*) AS entries FROM {} GROUP BY table_name ORDER BY entries DESC, table_name",
            self.log_table
        );

        sqlx::query_as::<_, (String, i64)>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
