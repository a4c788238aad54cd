//! Deletion audit admin CLI
//!
//! Run with:
//! ```bash
//! cargo run -p audit-admin -- install
//! cargo run -p audit-admin -- status
//! cargo run -p audit-admin -- log --table orders --limit 20
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use audit_common::{try_init_tracing_with_config, AppConfig, AppError, AppResult, TracingConfig};
use audit_db::create_pool;

/// Install, inspect and query the deletion audit trail.
#[derive(Parser)]
#[command(
    name = "audit-admin",
    version,
    about = "Deletion audit trail administration",
    long_about = "Installs the deletion audit function and per-table triggers,\n\
                  reports trigger coverage, and queries the deletion log."
)]
struct Cli {
    /// Audit this schema instead of AUDIT_SCHEMA
    #[arg(long, global = true)]
    schema: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the log table and audit function, then attach triggers to every eligible table.
    Install {
        /// Show which tables would be audited without changing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Report trigger coverage; exits non-zero unless every eligible table is covered.
    Status,
    /// Remove every audit trigger from the schema.
    Uninstall {
        /// Also drop the audit function
        #[arg(long)]
        drop_function: bool,
    },
    /// List deletion log entries, newest first.
    Log {
        /// Only entries for this table
        #[arg(long)]
        table: Option<String>,
        /// Only entries by this user id (-1 for anonymous)
        #[arg(long, allow_hyphen_values = true)]
        actor: Option<i32>,
        /// Only entries for this primary key
        #[arg(long)]
        record_id: Option<i64>,
        /// Only entries older than this log id
        #[arg(long)]
        before: Option<i64>,
        /// Maximum number of entries
        #[arg(long)]
        limit: Option<i64>,
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a single log entry, including the deleted row.
    Show {
        /// Log entry id
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %e, code = e.error_code(), "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_app(&config.app)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let mut settings = config.audit.settings()?;
    if let Some(schema) = cli.schema.as_deref() {
        settings = settings.for_schema(schema)?;
    }

    info!(
        env = ?config.app.env,
        schema = %settings.schema,
        log_table = %settings.log_table,
        "Configuration loaded"
    );

    let pool = create_pool(&config.database)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let result = commands::dispatch(cli.command, &pool, &settings).await;
    pool.close().await;
    result
}
