//! Preferences, option snapshots and the per-session configuration context.

pub mod catalog;
pub mod context;
pub mod preferences;
pub mod snapshot;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use catalog::{DEFAULT_ENABLED_OPTIONS, OptionCatalog, OptionSpec};
pub use context::{ConfigurationContext, ConfigurationView};
pub use preferences::{
    ChangeListener, ConfigurationSource, PreferenceChange, PreferenceStore, PreferenceValue,
    SubscriptionId,
};
pub use snapshot::ConfigurationSnapshot;

/// Typed value of an analyzer option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    StringList(Vec<String>),
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Boolean(_) => OptionKind::Boolean,
            OptionValue::Integer(_) => OptionKind::Integer,
            OptionValue::StringList(_) => OptionKind::StringList,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::StringList(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Boolean(value) => write!(f, "{value}"),
            OptionValue::Integer(value) => write!(f, "{value}"),
            OptionValue::StringList(values) => write!(f, "{}", values.join(",")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Boolean,
    Integer,
    StringList,
}
