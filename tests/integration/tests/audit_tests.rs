//! Deletion audit end-to-end tests
//!
//! These tests require a running PostgreSQL instance.
//! Environment variables: DATABASE_URL
//!
//! Run with: cargo test -p integration-tests --test audit_tests

use std::collections::BTreeSet;

use audit_core::{Actor, SkipReason, TableOutcome, TablePattern, TriggerInstaller};
use audit_db::{catalog, PgTriggerInstaller};
use integration_tests::{check_test_env, fixtures::*, TestSchema};
use serde_json::json;

// ============================================================================
// Installation Tests
// ============================================================================

#[tokio::test]
async fn test_bootstrap_classifies_tables() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&all_tables(&schema.name())).await.unwrap();

    let report = schema.bootstrap().await.unwrap();
    assert!(report.is_success());

    let installed: Vec<&str> = report.installed().collect();
    assert_eq!(installed, vec!["notes", "orders"]);

    let skipped: Vec<(&str, &SkipReason)> = report.skipped().collect();
    assert_eq!(
        skipped,
        vec![
            (
                "alembic_version",
                &SkipReason::ExcludedByPattern("alembic_%".to_string())
            ),
            ("deletion_log", &SkipReason::LogTable),
            ("order_tags", &SkipReason::NoSingleColumnKey),
        ]
    );

    schema.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_install_twice_keeps_one_trigger_per_table() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&all_tables(&schema.name())).await.unwrap();

    schema.bootstrap().await.unwrap();
    let second = schema.install().await.unwrap();
    assert!(second.is_success());
    assert!(second.removed_stale.is_empty());

    assert_eq!(
        schema.triggers_on("orders").await.unwrap(),
        vec!["orders_deletion_log_trigger".to_string()]
    );
    assert_eq!(
        schema.triggers_on("notes").await.unwrap(),
        vec!["notes_deletion_log_trigger".to_string()]
    );

    let status = schema.installer().status().await.unwrap();
    assert!(status.is_converged());
    assert_eq!(status.covered, vec!["notes", "orders"]);

    // Still exactly one entry per delete
    schema.delete_as(Actor::User(1), "orders", 1).await.unwrap();
    assert_eq!(schema.entries_for("orders").await.unwrap().len(), 1);

    schema.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_new_table_is_covered_after_rerun() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&orders_table(&schema.name())).await.unwrap();
    schema.bootstrap().await.unwrap();

    schema
        .exec(&numbered_table(&schema.name(), "invoices", 2))
        .await
        .unwrap();

    let status = schema.installer().status().await.unwrap();
    assert_eq!(status.missing, vec!["invoices"]);
    assert!(!status.is_converged());

    // Not yet audited
    schema.delete_as(Actor::User(3), "invoices", 1).await.unwrap();
    assert!(schema.entries_for("invoices").await.unwrap().is_empty());

    let report = schema.install().await.unwrap();
    assert!(report.installed().any(|t| t == "invoices"));

    schema.delete_as(Actor::User(3), "invoices", 2).await.unwrap();
    let entries = schema.entries_for("invoices").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].record_id, 2);
    assert_eq!(entries[0].deleted_by, Actor::User(3));

    schema.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_renamed_and_misplaced_triggers_are_removed() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    let name = schema.name();
    schema.exec(&all_tables(&name)).await.unwrap();
    schema.bootstrap().await.unwrap();

    let function = schema.settings.qualified_function();
    schema
        .exec(&format!(
            "CREATE TRIGGER legacy_audit BEFORE DELETE ON {name}.orders \
             FOR EACH ROW EXECUTE FUNCTION {function}('id');
             CREATE TRIGGER alembic_version_deletion_log_trigger BEFORE DELETE ON {name}.alembic_version \
             FOR EACH ROW EXECUTE FUNCTION {function}('id');"
        ))
        .await
        .unwrap();

    let status = schema.installer().status().await.unwrap();
    assert!(!status.is_converged());
    assert_eq!(status.stale.len(), 2);

    let report = schema.install().await.unwrap();
    let removed: BTreeSet<&str> = report.removed_stale.iter().map(String::as_str).collect();
    assert_eq!(
        removed,
        BTreeSet::from(["alembic_version_deletion_log_trigger", "legacy_audit"])
    );

    assert_eq!(
        schema.triggers_on("orders").await.unwrap(),
        vec!["orders_deletion_log_trigger".to_string()]
    );
    assert!(schema.triggers_on("alembic_version").await.unwrap().is_empty());
    assert!(schema.installer().status().await.unwrap().is_converged());

    schema.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_newly_excluded_table_loses_its_trigger() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&all_tables(&schema.name())).await.unwrap();
    schema.bootstrap().await.unwrap();

    let mut settings = schema.settings.clone();
    settings.excluded.push(TablePattern::parse("note_").unwrap());
    let installer = PgTriggerInstaller::new(schema.pool.clone(), settings);

    let report = installer.install().await.unwrap();
    assert!(report.removed_stale.contains(&"notes_deletion_log_trigger".to_string()));
    let notes = report.tables.iter().find(|r| r.table == "notes").unwrap();
    assert_eq!(
        notes.outcome,
        TableOutcome::Skipped {
            reason: SkipReason::ExcludedByPattern("note_".to_string())
        }
    );

    schema.delete_with_setting(Some("9"), "notes", 10).await.unwrap();
    assert!(schema.entries_for("notes").await.unwrap().is_empty());

    schema.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_uninstall_removes_coverage() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&all_tables(&schema.name())).await.unwrap();
    schema.bootstrap().await.unwrap();

    let dropped = schema.installer().uninstall(true).await.unwrap();
    assert_eq!(dropped, 2);
    assert!(!catalog::function_exists(&schema.pool, &schema.settings)
        .await
        .unwrap());

    let status = schema.installer().status().await.unwrap();
    assert!(status.covered.is_empty());
    assert_eq!(status.missing, vec!["notes", "orders"]);

    schema.delete_as(Actor::User(1), "orders", 1).await.unwrap();
    assert_eq!(schema.log_count().await.unwrap(), 0);

    schema.cleanup().await.unwrap();
}

// ============================================================================
// Audit Function Tests
// ============================================================================

#[tokio::test]
async fn test_delete_records_actor_and_snapshot() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&orders_table(&schema.name())).await.unwrap();
    schema.bootstrap().await.unwrap();

    let before = schema.server_clock().await.unwrap();
    assert_eq!(schema.delete_as(Actor::User(42), "orders", 1).await.unwrap(), 1);
    let after = schema.server_clock().await.unwrap();
    assert!(!schema.row_exists("orders", 1).await.unwrap());

    let entries = schema.entries_for("orders").await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.deleted_by, Actor::User(42));
    assert_eq!(entry.table_name, "orders");
    assert_eq!(entry.record_id, 1);
    assert_eq!(entry.field("id"), Some(&json!(1)));
    assert_eq!(entry.field("customer"), Some(&json!("alice")));
    assert_eq!(entry.field("total"), Some(&json!(12.50)));
    assert_eq!(entry.field("tags"), Some(&json!(["rush"])));
    assert!(
        before <= entry.deleted_at && entry.deleted_at <= after,
        "deleted_at {} outside [{before}, {after}]",
        entry.deleted_at
    );

    schema.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_bulk_delete_logs_every_row() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&orders_table(&schema.name())).await.unwrap();
    schema.bootstrap().await.unwrap();

    schema
        .exec(&format!("DELETE FROM {}.orders", schema.name()))
        .await
        .unwrap();

    let entries = schema.entries_for("orders").await.unwrap();
    let ids: BTreeSet<i64> = entries.iter().map(|e| e.record_id).collect();
    assert_eq!(entries.len(), 3);
    assert_eq!(ids, BTreeSet::from([1, 2, 3]));
    assert!(entries.iter().all(|e| e.deleted_by == Actor::Anonymous));

    schema.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_unset_actor_is_recorded_as_minus_one() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&notes_table(&schema.name())).await.unwrap();
    schema.bootstrap().await.unwrap();

    schema.delete_with_setting(None, "notes", 10).await.unwrap();
    schema.delete_as(Actor::Anonymous, "notes", 20).await.unwrap();

    let entries = schema.entries_for("notes").await.unwrap();
    assert_eq!(entries.len(), 2);
    for entry in &entries {
        assert_eq!(entry.deleted_by, Actor::Anonymous);
        assert_eq!(entry.deleted_by.id(), -1);
    }
    // NULL columns survive in the snapshot
    let second = entries.iter().find(|e| e.record_id == 20).unwrap();
    assert_eq!(second.field("body"), Some(&serde_json::Value::Null));

    schema.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_actor_setting_resolution() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    let cases: &[(&str, i32)] = &[
        ("42", 42),
        (" 17 ", 17),
        ("+5", 5),
        ("-3", -3),
        ("", -1),
        ("   ", -1),
        ("abc", -1),
        ("12abc", -1),
        ("4.5", -1),
        ("99999999999", -1),
    ];
    schema
        .exec(&numbered_table(&schema.name(), "items", cases.len() as i32))
        .await
        .unwrap();
    schema.bootstrap().await.unwrap();

    for (row, (setting, _)) in (1_i64..).zip(cases) {
        schema
            .delete_with_setting(Some(*setting), "items", row)
            .await
            .unwrap();
    }

    let entries = schema.entries_for("items").await.unwrap();
    assert_eq!(entries.len(), cases.len());
    for (row, (setting, expected)) in (1_i64..).zip(cases) {
        let entry = entries.iter().find(|e| e.record_id == row).unwrap();
        assert_eq!(entry.deleted_by.id(), *expected, "setting {setting:?}");
        assert_eq!(Actor::from_setting(Some(*setting)).id(), *expected);
    }

    schema.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_failed_log_insert_aborts_delete() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&orders_table(&schema.name())).await.unwrap();
    schema.bootstrap().await.unwrap();

    // Make every audit insert for `orders` fail
    schema
        .exec(&format!(
            "ALTER TABLE {} ADD CONSTRAINT reject_orders CHECK (table_name <> 'orders')",
            schema.settings.qualified_log_table()
        ))
        .await
        .unwrap();

    assert!(schema.delete_as(Actor::User(1), "orders", 2).await.is_err());
    assert!(schema.delete_with_setting(None, "orders", 3).await.is_err());

    assert!(schema.row_exists("orders", 2).await.unwrap());
    assert!(schema.row_exists("orders", 3).await.unwrap());
    assert_eq!(schema.log_count().await.unwrap(), 0);

    schema.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_excluded_table_is_not_audited() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&all_tables(&schema.name())).await.unwrap();
    schema.bootstrap().await.unwrap();

    schema
        .delete_with_setting(Some("7"), "alembic_version", 1)
        .await
        .unwrap();

    assert!(schema.triggers_on("alembic_version").await.unwrap().is_empty());
    assert_eq!(schema.log_count().await.unwrap(), 0);

    schema.cleanup().await.unwrap();
}

// ============================================================================
// Log Table Tests
// ============================================================================

#[tokio::test]
async fn test_deleting_log_rows_is_not_logged() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&orders_table(&schema.name())).await.unwrap();
    schema.bootstrap().await.unwrap();

    schema.delete_as(Actor::User(1), "orders", 1).await.unwrap();
    schema.delete_as(Actor::User(1), "orders", 2).await.unwrap();
    assert_eq!(schema.log_count().await.unwrap(), 2);

    let log = schema.settings.qualified_log_table();
    schema
        .exec(&format!("DELETE FROM {log} WHERE record_id = 1"))
        .await
        .unwrap();

    assert_eq!(schema.log_count().await.unwrap(), 1);
    assert!(schema.entries_for("deletion_log").await.unwrap().is_empty());
    assert_eq!(
        schema.triggers_on("deletion_log").await.unwrap(),
        vec!["deletion_log_append_only_trigger".to_string()]
    );

    schema.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_log_rejects_updates() {
    if !check_test_env() {
        return;
    }

    let schema = TestSchema::create().await.unwrap();
    schema.exec(&orders_table(&schema.name())).await.unwrap();
    schema.bootstrap().await.unwrap();
    schema.delete_as(Actor::User(8), "orders", 1).await.unwrap();

    let err = schema
        .exec(&format!(
            "UPDATE {} SET deleted_by = 99",
            schema.settings.qualified_log_table()
        ))
        .await
        .unwrap_err();

    let code = err
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|db| db.code())
        .map(|c| c.into_owned());
    // restrict_violation
    assert_eq!(code.as_deref(), Some("23001"));

    let entries = schema.entries_for("orders").await.unwrap();
    assert_eq!(entries[0].deleted_by, Actor::User(8));

    schema.cleanup().await.unwrap();
}
