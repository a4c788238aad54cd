//! Repository traits (ports)

mod repositories;

pub use repositories::{DeletionLogRepository, RepoResult, TriggerInstaller};
