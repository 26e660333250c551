//! Factory configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// What a Singleton or Setter does when several members match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Take the first candidate in discovery order (fields before methods).
    #[default]
    FirstMatch,
    /// Fail synthesis with `AmbiguousMember`.
    Reject,
}

/// What a Map does when two members yield the same key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Fail synthesis with `DuplicateMapKey`.
    #[default]
    Reject,
    /// Keep the earliest member for the key.
    KeepFirst,
    /// Let the latest member replace earlier ones.
    Overwrite,
}

/// Configuration for an adapter factory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    pub ambiguity: AmbiguityPolicy,
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Use identity when no translator matches but the source type is
    /// assignable to the target type.
    pub implicit_identity: bool,
    /// Check wrapper argument counts against the contract signature.
    pub strict_arity: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            ambiguity: AmbiguityPolicy::FirstMatch,
            duplicate_keys: DuplicateKeyPolicy::Reject,
            implicit_identity: true,
            strict_arity: true,
        }
    }
}

impl FactoryConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }
}
