//! Deletes carried out on behalf of a known actor
//!
//! The audit function reads the actor from a session setting. The setting is
//! applied with `set_config(.., true)`, which scopes it to the current
//! transaction, so it can never leak to the next user of a pooled connection.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use audit_core::{Actor, AuditSettings, DomainError, Identifier, RepoResult};

use super::error::{map_db_error, table_not_found};

/// SQLSTATE `undefined_table`
const UNDEFINED_TABLE: &str = "42P01";

/// Key column assumed when none is given
const DEFAULT_KEY_COLUMN: &str = "id";

/// A table addressed by schema, name and primary-key column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Identifier,
    pub name: Identifier,
    pub key_column: Identifier,
}

impl TableRef {
    /// Reference `schema.name` keyed by `id`
    pub fn new(schema: &str, name: &str) -> Result<Self, DomainError> {
        Ok(Self {
            schema: Identifier::new(schema)?,
            name: Identifier::new(name)?,
            key_column: Identifier::new(DEFAULT_KEY_COLUMN)?,
        })
    }

    pub fn with_key(mut self, key_column: &str) -> Result<Self, DomainError> {
        self.key_column = Identifier::new(key_column)?;
        Ok(self)
    }

    /// Quoted `"schema"."name"`
    pub fn qualified(&self) -> String {
        Identifier::qualified(&self.schema, &self.name)
    }
}

fn map_delete_error(table: &TableRef, e: sqlx::Error) -> DomainError {
    let undefined = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNDEFINED_TABLE);

    if undefined {
        table_not_found(table.schema.as_str(), table.name.as_str())
    } else {
        map_db_error(e)
    }
}

/// A transaction whose deletes are attributed to one actor
pub struct AuditedTransaction {
    tx: Transaction<'static, Postgres>,
    actor: Actor,
}

impl AuditedTransaction {
    /// Open a transaction and bind `actor` to the audit session setting
    #[instrument(skip(pool, settings), fields(actor = %actor))]
    pub async fn begin(pool: &PgPool, settings: &AuditSettings, actor: Actor) -> RepoResult<Self> {
        let mut tx = pool.begin().await.map_err(map_db_error)?;

        sqlx::query("SELECT set_config($1, $2, true)")
            .bind(settings.actor_setting.as_str())
            .bind(actor.setting_value())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        debug!("Actor bound to transaction");
        Ok(Self { tx, actor })
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    /// Delete the row whose key equals `id`, returning the number of rows removed
    #[instrument(skip(self), fields(actor = %self.actor, table = %table.name))]
    pub async fn delete_by_key(&mut self, table: &TableRef, id: i64) -> RepoResult<u64> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1",
            table.qualified(),
            table.key_column.quoted()
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_delete_error(table, e))?;

        Ok(result.rows_affected())
    }

    /// The underlying connection, for statements of the caller's own
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut *self.tx
    }

    pub async fn commit(self) -> RepoResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }

    pub async fn rollback(self) -> RepoResult<()> {
        self.tx.rollback().await.map_err(map_db_error)
    }
}

/// One-shot audited deletes, each in its own transaction
#[derive(Clone)]
pub struct PgAuditedDeleter {
    pool: PgPool,
    settings: AuditSettings,
}

impl PgAuditedDeleter {
    /// Create a new PgAuditedDeleter
    pub fn new(pool: PgPool, settings: AuditSettings) -> Self {
        Self { pool, settings }
    }

    /// Begin a transaction attributed to `actor`
    pub async fn begin(&self, actor: Actor) -> RepoResult<AuditedTransaction> {
        AuditedTransaction::begin(&self.pool, &self.settings, actor).await
    }

    /// Delete one row as `actor` and commit
    #[instrument(skip(self), fields(actor = %actor, table = %table.name))]
    pub async fn delete(&self, actor: Actor, table: &TableRef, id: i64) -> RepoResult<u64> {
        let mut tx = self.begin(actor).await?;
        let deleted = tx.delete_by_key(table, id).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}
