//! Application error types
//!
//! Unified error handling for the admin tooling and embedding applications.

use audit_core::DomainError;

use crate::config::ConfigError;
use crate::telemetry::TracingError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Installer errors
    #[error("Trigger installation failed on {failed} table(s)")]
    InstallFailed { failed: usize },

    #[error("Audit coverage is not converged: {missing} missing, {stale} stale")]
    NotConverged { missing: usize, stale: usize },

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Process exit code for command-line tools
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Tracing(_) => 78,
            Self::InstallFailed { .. } | Self::NotConverged { .. } => 1,
            Self::Domain(e) if e.is_validation() => 65,
            Self::Domain(e) if e.is_not_found() => 66,
            Self::Database(_) | Self::Domain(_) | Self::Internal(_) => 70,
        }
    }

    /// Get error code for reports
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Tracing(_) => "TRACING_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::InstallFailed { .. } => "INSTALL_FAILED",
            Self::NotConverged { .. } => "NOT_CONVERGED",
            Self::Domain(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
