//! PostgreSQL identifiers and derived trigger names
//!
//! Every table, schema, function and trigger name that ends up in dynamically
//! built SQL goes through [`Identifier::quoted`]. Names are never spliced into
//! statements unquoted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Longest identifier PostgreSQL keeps (NAMEDATALEN - 1); longer names are truncated by the server
pub const MAX_IDENTIFIER_BYTES: usize = 63;

/// Suffix appended to a table name to form its audit trigger name
pub const TRIGGER_SUFFIX: &str = "_deletion_log_trigger";

/// A validated PostgreSQL identifier (schema, table, column, function)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Validate and wrap a raw identifier.
    ///
    /// Rejects empty names, names containing NUL, and names longer than
    /// [`MAX_IDENTIFIER_BYTES`] (the server would silently truncate them,
    /// making catalog lookups miss).
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();

        if name.is_empty() {
            return Err(DomainError::InvalidIdentifier(
                "identifier must not be empty".to_string(),
            ));
        }
        if name.contains('\0') {
            return Err(DomainError::InvalidIdentifier(format!(
                "identifier contains a NUL byte: {name:?}"
            )));
        }
        if name.len() > MAX_IDENTIFIER_BYTES {
            return Err(DomainError::InvalidIdentifier(format!(
                "identifier exceeds {MAX_IDENTIFIER_BYTES} bytes: {name}"
            )));
        }

        Ok(Self(name))
    }

    /// Wrap a known-good constant name
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(Self::new(name).is_ok(), "invalid constant identifier {name}");
        Self(name.to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form safe to embed in SQL: `my"table` becomes `"my""table"`
    pub fn quoted(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 2);
        out.push('"');
        for ch in self.0.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
        out
    }

    /// Append a suffix, truncating to [`MAX_IDENTIFIER_BYTES`] the way the server does
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let mut name = format!("{}{suffix}", self.0);
        if name.len() > MAX_IDENTIFIER_BYTES {
            let mut cut = MAX_IDENTIFIER_BYTES;
            while !name.is_char_boundary(cut) {
                cut -= 1;
            }
            name.truncate(cut);
        }
        Self(name)
    }

    /// Schema-qualified, quoted name: `"schema"."name"`
    pub fn qualified(schema: &Identifier, name: &Identifier) -> String {
        format!("{}.{}", schema.quoted(), name.quoted())
    }
}

/// Quote a string as a SQL literal: `it's` becomes `'it''s'`
///
/// Used for trigger arguments and setting names inside generated DDL, where
/// bind parameters are not available.
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl std::str::FromStr for Identifier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Deterministic name of the audit trigger attached to a table
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerName(Identifier);

impl TriggerName {
    /// `<table>_deletion_log_trigger`, truncated the same way the server truncates
    pub fn for_table(table: &Identifier) -> Self {
        Self(table.with_suffix(TRIGGER_SUFFIX))
    }

    #[inline]
    pub fn as_identifier(&self) -> &Identifier {
        &self.0
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check whether a trigger name from the catalog is the one derived for `table`
    pub fn matches(&self, catalog_name: &str) -> bool {
        self.as_str() == catalog_name
    }
}

impl fmt::Display for TriggerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
