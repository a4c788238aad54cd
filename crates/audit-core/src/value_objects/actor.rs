//! Actor - the user a delete is attributed to
//!
//! The audit function reads the actor from a transaction-local session
//! setting. Resolution never fails: anything that is not a usable integer
//! is treated as an anonymous actor and recorded as `-1`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier recorded in `deleted_by` when no actor is known
pub const ANONYMOUS_ACTOR_ID: i32 = -1;

/// Characters stripped from the setting value, matching the trigger's `btrim`
const SETTING_PADDING: [char; 4] = [' ', '\t', '\r', '\n'];

/// The acting user of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Actor {
    /// No (or no usable) user identifier was provided
    #[default]
    Anonymous,
    /// A known application user
    User(i32),
}

impl Actor {
    /// Build an actor from a raw user id, mapping the sentinel back to `Anonymous`
    #[inline]
    pub const fn from_id(id: i32) -> Self {
        if id == ANONYMOUS_ACTOR_ID {
            Self::Anonymous
        } else {
            Self::User(id)
        }
    }

    /// Resolve an actor from a session setting value.
    ///
    /// Mirrors the resolution done inside the trigger function: absent,
    /// blank, non-numeric and out-of-range values all become `Anonymous`.
    pub fn from_setting(value: Option<&str>) -> Self {
        value
            .map(|v| v.trim_matches(SETTING_PADDING))
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<i32>().ok())
            .map_or(Self::Anonymous, Self::from_id)
    }

    /// The value written to `deleted_by`
    #[inline]
    pub const fn id(self) -> i32 {
        match self {
            Self::Anonymous => ANONYMOUS_ACTOR_ID,
            Self::User(id) => id,
        }
    }

    #[inline]
    pub const fn is_anonymous(self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Value to store in the session setting.
    ///
    /// Anonymous maps to an empty string, which the trigger resolves to `-1`.
    pub fn setting_value(self) -> String {
        match self {
            Self::Anonymous => String::new(),
            Self::User(id) => id.to_string(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

impl From<i32> for Actor {
    fn from(id: i32) -> Self {
        Self::from_id(id)
    }
}

impl From<Actor> for i32 {
    fn from(actor: Actor) -> Self {
        actor.id()
    }
}

// Serialized as the raw `deleted_by` value so exports match the table
impl Serialize for Actor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i32(self.id())
    }
}

impl<'de> Deserialize<'de> for Actor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        i32::deserialize(deserializer).map(Self::from_id)
    }
}
