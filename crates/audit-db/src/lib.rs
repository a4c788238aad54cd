//! # audit-db
//!
//! PostgreSQL side of the deletion audit trail, built on SQLx.
//!
//! ## Overview
//!
//! - Connection pool management
//! - DDL for the deletion log, its append-only guard and the audit function
//! - Catalog reads and the idempotent trigger installer
//! - The deletion log repository and actor-attributed transactions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use audit_common::AppConfig;
//! use audit_core::{Actor, DeletionLogRepository};
//! use audit_db::{bootstrap, create_pool, PgAuditedDeleter, PgDeletionLogRepository, TableRef};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let settings = config.audit.settings()?;
//!     let pool = create_pool(&config.database).await?;
//!
//!     bootstrap(&pool, &settings).await?;
//!
//!     let deleter = PgAuditedDeleter::new(pool.clone(), settings.clone());
//!     deleter.delete(Actor::User(42), &TableRef::new("public", "orders")?, 7).await?;
//!
//!     let log = PgDeletionLogRepository::new(pool, &settings);
//!     let entries = log.find_by_record("orders", 7).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod installer;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod schema;
pub mod sql;

// Re-export commonly used types
pub use installer::PgTriggerInstaller;
pub use pool::{connect_options, create_pool, PgPool, PoolTimeouts};
pub use repositories::{AuditedTransaction, PgAuditedDeleter, PgDeletionLogRepository, TableRef};
pub use schema::{bootstrap, ensure_log_table};
