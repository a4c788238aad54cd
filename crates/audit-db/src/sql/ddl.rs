//! DDL builders for the deletion log, its append-only guard and the audit trigger
//!
//! Names are always rendered through `Identifier::quoted` and literals through
//! `quote_literal`; nothing from the catalog or configuration is spliced raw.

use audit_core::{quote_literal, AuditSettings, DomainError, Identifier, TriggerName};

/// Dollar-quote tag wrapping the audit function body
const AUDIT_BODY_TAG: &str = "$audit$";

/// Dollar-quote tag wrapping the append-only guard body
const GUARD_BODY_TAG: &str = "$guard$";

/// Name of the function rejecting updates on the log table
pub fn guard_function_name(settings: &AuditSettings) -> Identifier {
    settings.log_table.with_suffix("_append_only")
}

/// Name of the trigger rejecting updates on the log table
pub fn guard_trigger_name(settings: &AuditSettings) -> Identifier {
    settings.log_table.with_suffix("_append_only_trigger")
}

fn ensure_tag_free(sql_fragment: &str, tag: &str) -> Result<(), DomainError> {
    if sql_fragment.contains(tag) {
        return Err(DomainError::InvalidIdentifier(format!(
            "name collides with dollar-quote tag {tag}: {sql_fragment}"
        )));
    }
    Ok(())
}

/// `CREATE SCHEMA IF NOT EXISTS` for the audited schema
pub fn create_schema_sql(settings: &AuditSettings) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", settings.schema.quoted())
}

/// The deletion log table
pub fn log_table_ddl(settings: &AuditSettings) -> String {
    format!(
        r"CREATE TABLE IF NOT EXISTS {log} (
    id          BIGSERIAL   PRIMARY KEY,
    deleted_by  INTEGER     NOT NULL DEFAULT -1,
    table_name  TEXT        NOT NULL,
    record_id   BIGINT      NOT NULL,
    record_data JSONB       NOT NULL,
    deleted_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)",
        log = settings.qualified_log_table()
    )
}

/// Lookup indexes on the deletion log
pub fn log_index_ddl(settings: &AuditSettings) -> Vec<String> {
    let log = settings.qualified_log_table();
    let record_idx = settings.log_table.with_suffix("_table_record_idx");
    let time_idx = settings.log_table.with_suffix("_deleted_at_idx");

    vec![
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {log} (table_name, record_id)",
            record_idx.quoted()
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {log} (deleted_at)",
            time_idx.quoted()
        ),
    ]
}

/// Function and trigger that reject `UPDATE` on the log table
pub fn append_only_guard_ddl(settings: &AuditSettings) -> Result<Vec<String>, DomainError> {
    let function = Identifier::qualified(&settings.schema, &guard_function_name(settings));
    let trigger = guard_trigger_name(settings).quoted();
    let log = settings.qualified_log_table();
    ensure_tag_free(&function, GUARD_BODY_TAG)?;

    Ok(vec![
        format!(
            r"CREATE OR REPLACE FUNCTION {function}()
RETURNS trigger
LANGUAGE plpgsql
AS {GUARD_BODY_TAG}
BEGIN
    RAISE EXCEPTION '% is append-only', TG_TABLE_NAME
        USING ERRCODE = 'restrict_violation';
END;
{GUARD_BODY_TAG}"
        ),
        format!("DROP TRIGGER IF EXISTS {trigger} ON {log}"),
        format!(
            "CREATE TRIGGER {trigger} BEFORE UPDATE ON {log} FOR EACH ROW EXECUTE FUNCTION {function}()"
        ),
    ])
}

/// The shared audit trigger function.
///
/// Resolves the actor from the session setting without ever raising:
/// missing, blank, non-numeric and out-of-range values all become `-1`.
/// The insert itself is unguarded, so any failure aborts the delete.
/// The primary-key column name arrives as the first trigger argument.
pub fn audit_function_ddl(settings: &AuditSettings) -> Result<String, DomainError> {
    let function = settings.qualified_function();
    let log = settings.qualified_log_table();
    ensure_tag_free(&function, AUDIT_BODY_TAG)?;
    ensure_tag_free(&log, AUDIT_BODY_TAG)?;
    let setting = quote_literal(settings.actor_setting.as_str());

    Ok(format!(
        r"CREATE OR REPLACE FUNCTION {function}()
RETURNS trigger
LANGUAGE plpgsql
AS {AUDIT_BODY_TAG}
DECLARE
    actor_setting TEXT;
    actor_id      INTEGER := -1;
    record_json   JSONB;
BEGIN
    actor_setting := btrim(coalesce(current_setting({setting}, TRUE), ''), E' \t\r\n');

    IF actor_setting ~ '^[+-]?[0-9]+$' THEN
        BEGIN
            actor_id := actor_setting::INTEGER;
        EXCEPTION WHEN numeric_value_out_of_range THEN
            actor_id := -1;
        END;
    END IF;

    record_json := to_jsonb(OLD);

    INSERT INTO {log} (deleted_by, table_name, record_id, record_data, deleted_at)
    VALUES (actor_id, TG_TABLE_NAME, (record_json ->> TG_ARGV[0])::BIGINT, record_json, now());

    RETURN OLD;
END;
{AUDIT_BODY_TAG}"
    ))
}

/// `DROP FUNCTION IF EXISTS` for the audit function
pub fn drop_function_sql(settings: &AuditSettings) -> String {
    format!("DROP FUNCTION IF EXISTS {}()", settings.qualified_function())
}

/// `DROP TRIGGER IF EXISTS` on one table
pub fn drop_trigger_sql(trigger: &Identifier, schema: &Identifier, table: &Identifier) -> String {
    format!(
        "DROP TRIGGER IF EXISTS {} ON {}",
        trigger.quoted(),
        Identifier::qualified(schema, table)
    )
}

/// `CREATE TRIGGER ... BEFORE DELETE ... FOR EACH ROW` bound to the audit function
pub fn create_trigger_sql(
    settings: &AuditSettings,
    trigger: &TriggerName,
    table: &Identifier,
    key_column: &Identifier,
) -> String {
    format!(
        "CREATE TRIGGER {} BEFORE DELETE ON {} FOR EACH ROW EXECUTE FUNCTION {}({})",
        trigger.as_identifier().quoted(),
        Identifier::qualified(&settings.schema, table),
        settings.qualified_function(),
        quote_literal(key_column.as_str())
    )
}
