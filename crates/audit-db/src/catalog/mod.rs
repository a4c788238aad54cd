//! Live catalog reads: tables of a schema and the audit triggers attached to them

use sqlx::PgPool;
use tracing::instrument;

use audit_core::{AuditSettings, AuditedTable, RepoResult};

use crate::models::{CatalogTableModel, CatalogTriggerModel};
use crate::repositories::map_db_error;

/// Ordinary tables in `schema` with their single-column primary key, if any
#[instrument(skip(pool))]
pub async fn list_tables(pool: &PgPool, schema: &str) -> RepoResult<Vec<AuditedTable>> {
    let rows = sqlx::query_as::<_, CatalogTableModel>(
        r"
        SELECT c.relname::text AS name,
               pk.key_column,
               pk.key_type
        FROM pg_catalog.pg_class c
        JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
        LEFT JOIN LATERAL (
            SELECT a.attname::text AS key_column,
                   format_type(a.atttypid, NULL) AS key_type
            FROM pg_catalog.pg_index i
            JOIN pg_catalog.pg_attribute a
              ON a.attrelid = i.indrelid AND a.attnum = i.indkey[0]
            WHERE i.indrelid = c.oid
              AND i.indisprimary
              AND i.indnkeyatts = 1
        ) pk ON TRUE
        WHERE n.nspname = $1
          AND c.relkind = 'r'
        ORDER BY c.relname
        ",
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?;

    Ok(rows.into_iter().map(AuditedTable::from).collect())
}

/// Triggers in the audited schema that call the audit function
#[instrument(skip(pool, settings), fields(schema = %settings.schema))]
pub async fn list_audit_triggers(
    pool: &PgPool,
    settings: &AuditSettings,
) -> RepoResult<Vec<CatalogTriggerModel>> {
    // tgtype bits: ROW = 1, BEFORE = 2, DELETE = 8
    sqlx::query_as::<_, CatalogTriggerModel>(
        r"
        SELECT c.relname::text AS table_name,
               t.tgname::text AS trigger_name,
               (t.tgtype::int & 11) = 11 AS before_row_delete
        FROM pg_catalog.pg_trigger t
        JOIN pg_catalog.pg_class c ON c.oid = t.tgrelid
        JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
        JOIN pg_catalog.pg_proc p ON p.oid = t.tgfoid
        JOIN pg_catalog.pg_namespace pn ON pn.oid = p.pronamespace
        WHERE NOT t.tgisinternal
          AND n.nspname = $1
          AND pn.nspname = $1
          AND p.proname = $2
        ORDER BY c.relname, t.tgname
        ",
    )
    .bind(settings.schema.as_str())
    .bind(settings.function.as_str())
    .fetch_all(pool)
    .await
    .map_err(map_db_error)
}

/// Whether an ordinary table exists in `schema`
#[instrument(skip(pool))]
pub async fn table_exists(pool: &PgPool, schema: &str, table: &str) -> RepoResult<bool> {
    sqlx::query_scalar::<_, bool>(
        r"
        SELECT EXISTS(
            SELECT 1
            FROM pg_catalog.pg_class c
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = $1 AND c.relname = $2 AND c.relkind = 'r'
        )
        ",
    )
    .bind(schema)
    .bind(table)
    .fetch_one(pool)
    .await
    .map_err(map_db_error)
}

/// Whether the audit function exists
#[instrument(skip(pool, settings), fields(function = %settings.function))]
pub async fn function_exists(pool: &PgPool, settings: &AuditSettings) -> RepoResult<bool> {
    sqlx::query_scalar::<_, bool>(
        r"
        SELECT EXISTS(
            SELECT 1
            FROM pg_catalog.pg_proc p
            JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace
            WHERE n.nspname = $1 AND p.proname = $2
        )
        ",
    )
    .bind(settings.schema.as_str())
    .bind(settings.function.as_str())
    .fetch_one(pool)
    .await
    .map_err(map_db_error)
}
