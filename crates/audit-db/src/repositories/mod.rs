//! Repository implementations
//!
//! The deletion log is read-only from here; rows only ever come from the
//! audit trigger. Deletes that should carry an actor go through
//! [`AuditedTransaction`].

mod audited;
mod deletion_log;
mod error;

pub use audited::{AuditedTransaction, PgAuditedDeleter, TableRef};
pub use deletion_log::PgDeletionLogRepository;
pub(crate) use error::map_db_error;
