//! PostgreSQL connection pool management

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;

use audit_common::{DatabaseConfig, DatabaseTarget};

/// Timeouts applied to every pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolTimeouts {
    /// Maximum time to wait for a connection
    pub acquire: Duration,
    /// Maximum idle time before a connection is closed
    pub idle: Duration,
    /// Maximum lifetime of a connection
    pub max_lifetime: Duration,
}

impl Default for PoolTimeouts {
    fn default() -> Self {
        Self {
            acquire: Duration::from_secs(10),
            idle: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// Build connect options from either a URL or discrete `PG_*` parts
pub fn connect_options(target: &DatabaseTarget) -> Result<PgConnectOptions, sqlx::Error> {
    match target {
        DatabaseTarget::Url(url) => url.parse::<PgConnectOptions>(),
        DatabaseTarget::Parts(parts) => Ok(PgConnectOptions::new()
            .host(&parts.host)
            .port(parts.port)
            .username(&parts.user)
            .password(&parts.password)
            .database(&parts.database)),
    }
}

/// Create a new PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let timeouts = PoolTimeouts::default();
    let options = connect_options(&config.target)?;

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(timeouts.acquire)
        .idle_timeout(timeouts.idle)
        .max_lifetime(timeouts.max_lifetime)
        .connect_with(options)
        .await
}
