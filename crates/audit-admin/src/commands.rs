//! Subcommand implementations

use tracing::{info, warn};

use audit_common::{AppError, AppResult};
use audit_core::{
    Actor, AuditSettings, DeletionLogQuery, DeletionLogRepository, TriggerInstaller,
};
use audit_db::{bootstrap, catalog, PgDeletionLogRepository, PgPool, PgTriggerInstaller};

use crate::output;
use crate::Command;

pub async fn dispatch(command: Command, pool: &PgPool, settings: &AuditSettings) -> AppResult<()> {
    match command {
        Command::Install { dry_run: true } => plan(pool, settings).await,
        Command::Install { dry_run: false } => install(pool, settings).await,
        Command::Status => status(pool, settings).await,
        Command::Uninstall { drop_function } => uninstall(pool, settings, drop_function).await,
        Command::Log {
            table,
            actor,
            record_id,
            before,
            limit,
            json,
        } => {
            let mut query = DeletionLogQuery::new();
            query.table_name = table;
            query.deleted_by = actor.map(Actor::from_id);
            query.record_id = record_id;
            query.before_id = before;
            query.limit = limit;
            log(pool, settings, &query, json).await
        }
        Command::Show { id } => show(pool, settings, id).await,
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

async fn plan(pool: &PgPool, settings: &AuditSettings) -> AppResult<()> {
    let installer = PgTriggerInstaller::new(pool.clone(), settings.clone());
    let plan = installer.plan().await?;
    print_lines(&output::plan_lines(&plan));
    Ok(())
}

async fn install(pool: &PgPool, settings: &AuditSettings) -> AppResult<()> {
    let report = bootstrap(pool, settings).await?;
    print_lines(&output::install_lines(&report));

    let failed = report.failed().count();
    if failed > 0 {
        return Err(AppError::InstallFailed { failed });
    }
    Ok(())
}

async fn status(pool: &PgPool, settings: &AuditSettings) -> AppResult<()> {
    if !catalog::function_exists(pool, settings).await? {
        warn!(function = %settings.qualified_function(), "Audit function is not installed");
        println!("audit function {} is not installed", settings.qualified_function());
    }

    let installer = PgTriggerInstaller::new(pool.clone(), settings.clone());
    let report = installer.status().await?;
    print_lines(&output::status_lines(&report));

    if !report.is_converged() {
        return Err(AppError::NotConverged {
            missing: report.missing.len(),
            stale: report.stale.len(),
        });
    }
    Ok(())
}

async fn uninstall(pool: &PgPool, settings: &AuditSettings, drop_function: bool) -> AppResult<()> {
    let installer = PgTriggerInstaller::new(pool.clone(), settings.clone());
    let dropped = installer.uninstall(drop_function).await?;

    println!("removed {dropped} audit trigger(s) from schema {}", settings.schema);
    if drop_function {
        println!("dropped function {}", settings.qualified_function());
    }
    Ok(())
}

async fn log(
    pool: &PgPool,
    settings: &AuditSettings,
    query: &DeletionLogQuery,
    json: bool,
) -> AppResult<()> {
    let repo = PgDeletionLogRepository::new(pool.clone(), settings);
    let entries = repo.list(query).await?;
    info!(count = entries.len(), "Deletion log listed");

    if json {
        let rendered = serde_json::to_string_pretty(&entries).map_err(AppError::internal)?;
        println!("{rendered}");
    } else {
        for entry in &entries {
            println!("{}", output::entry_line(entry));
        }
    }
    Ok(())
}

async fn show(pool: &PgPool, settings: &AuditSettings, id: i64) -> AppResult<()> {
    let repo = PgDeletionLogRepository::new(pool.clone(), settings);
    let entry = repo.get(id).await?;

    let rendered = serde_json::to_string_pretty(&entry).map_err(AppError::internal)?;
    println!("{rendered}");
    Ok(())
}
