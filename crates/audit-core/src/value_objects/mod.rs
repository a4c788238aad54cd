//! Value objects - immutable types that represent domain concepts

mod actor;
mod identifier;
mod setting_name;
mod table_pattern;

pub use actor::{Actor, ANONYMOUS_ACTOR_ID};
pub use identifier::{
    quote_literal, Identifier, TriggerName, MAX_IDENTIFIER_BYTES, TRIGGER_SUFFIX,
};
pub use setting_name::{SettingName, DEFAULT_ACTOR_SETTING};
pub use table_pattern::{TablePattern, DEFAULT_EXCLUDED_PATTERNS};
