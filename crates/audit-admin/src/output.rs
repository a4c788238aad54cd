//! Plain-text rendering of reports and log entries

use chrono::SecondsFormat;

use audit_core::{
    AuditedTable, CoverageReport, DeletionLogEntry, InstallReport, SkipReason, TableOutcome,
};

/// One line per table, followed by any stale triggers that were removed
pub fn install_lines(report: &InstallReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .tables
        .iter()
        .map(|r| match &r.outcome {
            TableOutcome::Installed => format!("installed  {}", r.table),
            TableOutcome::Skipped { reason } => format!("skipped    {} ({reason})", r.table),
            TableOutcome::Failed { error } => format!("FAILED     {}: {error}", r.table),
        })
        .collect();

    lines.extend(
        report
            .removed_stale
            .iter()
            .map(|name| format!("removed    trigger {name}")),
    );
    lines.push(format!(
        "{} installed, {} skipped, {} failed in schema {}",
        report.installed().count(),
        report.skipped().count(),
        report.failed().count(),
        report.schema
    ));
    lines
}

/// Classification of each table, as `install --dry-run` reports it
pub fn plan_lines(plan: &[(AuditedTable, Option<SkipReason>)]) -> Vec<String> {
    plan.iter()
        .map(|(table, skip)| match skip {
            None => format!(
                "audit      {} (key {})",
                table.name,
                table.key_column.as_deref().unwrap_or("id")
            ),
            Some(reason) => format!("skip       {} ({reason})", table.name),
        })
        .collect()
}

pub fn status_lines(report: &CoverageReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.extend(report.covered.iter().map(|t| format!("covered    {t}")));
    lines.extend(report.missing.iter().map(|t| format!("MISSING    {t}")));
    lines.extend(
        report
            .stale
            .iter()
            .map(|(table, trigger)| format!("STALE      {table} ({trigger})")),
    );
    lines.extend(report.skipped.iter().map(|r| match &r.outcome {
        TableOutcome::Skipped { reason } => format!("skipped    {} ({reason})", r.table),
        _ => format!("skipped    {}", r.table),
    }));
    lines.push(format!(
        "{} covered, {} missing, {} stale in schema {}",
        report.covered.len(),
        report.missing.len(),
        report.stale.len(),
        report.schema
    ));
    lines
}

/// `id  timestamp  actor  table#record`
pub fn entry_line(entry: &DeletionLogEntry) -> String {
    format!(
        "{:>8}  {}  {:<12}  {}#{}",
        entry.id,
        entry.deleted_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        entry.deleted_by.to_string(),
        entry.table_name,
        entry.record_id
    )
}
