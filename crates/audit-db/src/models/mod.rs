//! Database models - SQLx-compatible structs for the log table and catalog reads

mod catalog;
mod deletion_log;

pub use catalog::{CatalogTableModel, CatalogTriggerModel};
pub use deletion_log::DeletionLogModel;
