//! Name of the custom session setting that carries the actor id

use std::fmt;

use crate::error::DomainError;

pub const DEFAULT_ACTOR_SETTING: &str = "session.user_id";

/// A PostgreSQL custom setting name of the form `prefix.name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SettingName(String);

impl SettingName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();

        let valid_part = |part: &str| {
            !part.is_empty()
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !part.starts_with(|c: char| c.is_ascii_digit())
        };

        let mut parts = name.split('.');
        let well_formed = match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(key), None) => valid_part(prefix) && valid_part(key),
            _ => false,
        };

        if !well_formed {
            return Err(DomainError::InvalidSetting(format!(
                "expected `prefix.name` with alphanumeric parts, got {name:?}"
            )));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SettingName {
    fn default() -> Self {
        Self(DEFAULT_ACTOR_SETTING.to_string())
    }
}

impl fmt::Display for SettingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SettingName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
