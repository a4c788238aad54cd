//! Application configuration structs
//!
//! Loads configuration from environment variables and an optional `.env` file.

use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::Path;

use audit_core::settings::{DEFAULT_FUNCTION, DEFAULT_LOG_TABLE, DEFAULT_SCHEMA};
use audit_core::value_objects::{DEFAULT_ACTOR_SETTING, DEFAULT_EXCLUDED_PATTERNS};
use audit_core::{AuditSettings, TablePattern};

/// Marker file present inside Docker containers
const DOCKER_ENV_MARKER: &str = "/.dockerenv";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub audit: AuditConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
    pub log_format: LogFormat,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// JSON in production, human-readable elsewhere
    #[must_use]
    pub fn default_for(env: Environment) -> Self {
        if env.is_production() {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Where to connect: a full URL, or discrete connection parts
#[derive(Clone)]
pub enum DatabaseTarget {
    Url(String),
    Parts(PgParts),
}

/// Discrete PostgreSQL connection parameters (`PG_*` variables)
#[derive(Clone, PartialEq, Eq)]
pub struct PgParts {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

// Credentials stay out of logs
impl fmt::Debug for DatabaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(_) => f.write_str("Url(<redacted>)"),
            Self::Parts(parts) => f.debug_tuple("Parts").field(parts).finish(),
        }
    }
}

impl fmt::Debug for PgParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgParts")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Audit subsystem configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_log_table")]
    pub log_table: String,
    #[serde(default = "default_function")]
    pub function: String,
    #[serde(default = "default_actor_setting")]
    pub actor_setting: String,
    #[serde(default = "default_excluded_tables")]
    pub excluded_tables: Vec<String>,
}

impl AuditConfig {
    /// Validate names and patterns into [`AuditSettings`]
    pub fn settings(&self) -> Result<AuditSettings, ConfigError> {
        let excluded = self
            .excluded_tables
            .iter()
            .map(|p| TablePattern::parse(p))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::InvalidValue("AUDIT_EXCLUDE_TABLES", e.to_string()))?;

        AuditSettings::new(
            &self.schema,
            &self.log_table,
            &self.function,
            &self.actor_setting,
            excluded,
        )
        .map_err(|e| ConfigError::InvalidValue("AUDIT_*", e.to_string()))
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            log_table: default_log_table(),
            function: default_function(),
            actor_setting: default_actor_setting(),
            excluded_tables: default_excluded_tables(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "deletion-audit".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_pg_port() -> u16 {
    5432
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_log_table() -> String {
    DEFAULT_LOG_TABLE.to_string()
}

fn default_function() -> String {
    DEFAULT_FUNCTION.to_string()
}

fn default_actor_setting() -> String {
    DEFAULT_ACTOR_SETTING.to_string()
}

fn default_excluded_tables() -> Vec<String> {
    DEFAULT_EXCLUDED_PATTERNS.iter().map(ToString::to_string).collect()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let in_container = Path::new(DOCKER_ENV_MARKER).exists();
        Self::from_lookup(|key| env::var(key).ok(), in_container)
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// `in_container` selects the host used with discrete `PG_*` variables:
    /// `PG_HOST` inside a container, `localhost` otherwise.
    pub fn from_lookup<F>(lookup: F, in_container: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(raw) => Environment::parse(&raw)
                .ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
            None => default_env(),
        };

        let log_format = match lookup("LOG_FORMAT").map(|s| s.to_lowercase()) {
            Some(raw) if raw == "json" => LogFormat::Json,
            Some(raw) if raw == "pretty" => LogFormat::Pretty,
            Some(raw) => return Err(ConfigError::InvalidValue("LOG_FORMAT", raw)),
            None => LogFormat::default_for(env),
        };

        let target = match lookup("DATABASE_URL").filter(|s| !s.is_empty()) {
            Some(url) => DatabaseTarget::Url(url),
            None => DatabaseTarget::Parts(PgParts {
                host: if in_container {
                    lookup("PG_HOST").ok_or(ConfigError::MissingVar("PG_HOST"))?
                } else {
                    "localhost".to_string()
                },
                port: parse_or(&lookup, "PG_PORT", default_pg_port)?,
                user: lookup("PG_USER").ok_or(ConfigError::MissingVar("DATABASE_URL or PG_USER"))?,
                password: lookup("PG_PW").unwrap_or_default(),
                database: lookup("PG_DB").ok_or(ConfigError::MissingVar("DATABASE_URL or PG_DB"))?,
            }),
        };

        let audit = AuditConfig {
            schema: lookup("AUDIT_SCHEMA").unwrap_or_else(default_schema),
            log_table: lookup("AUDIT_LOG_TABLE").unwrap_or_else(default_log_table),
            function: lookup("AUDIT_FUNCTION").unwrap_or_else(default_function),
            actor_setting: lookup("AUDIT_ACTOR_SETTING").unwrap_or_else(default_actor_setting),
            excluded_tables: match lookup("AUDIT_EXCLUDE_TABLES") {
                Some(list) => TablePattern::parse_list(&list)
                    .map_err(|e| ConfigError::InvalidValue("AUDIT_EXCLUDE_TABLES", e.to_string()))?
                    .iter()
                    .map(|p| p.as_str().to_string())
                    .collect(),
                None => default_excluded_tables(),
            },
        };
        // Fail at load time rather than on first use
        audit.settings()?;

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
                log_format,
            },
            database: DatabaseConfig {
                target,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            audit,
        })
    }
}

fn parse_or<F, T, D>(lookup: &F, key: &'static str, default: D) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    D: FnOnce() -> T,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
