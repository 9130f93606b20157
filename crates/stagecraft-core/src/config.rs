// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A field holds a value the engine cannot use.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Knobs for one [`crate::Engine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Initial RNG state.
    pub seed: u32,
    /// Record identifier field used by the simulation diff.
    pub id_field: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            id_field: "id".to_owned(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON config. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty JSON form.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder-style seed override.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Builder-style id field override.
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Rejects an empty id field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id_field.is_empty() {
            return Err(ConfigError::Invalid("id_field must not be empty".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let parsed = EngineConfig::from_json_str("{}");
        assert!(matches!(parsed, Ok(c) if c == EngineConfig::default()));
    }

    #[test]
    fn partial_override() {
        let parsed = EngineConfig::from_json_str(r#"{"seed": 42}"#);
        assert!(matches!(parsed, Ok(c) if c.seed == 42 && c.id_field == "id"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = EngineConfig::from_json_str(r#"{"sead": 42}"#);
        assert!(matches!(parsed, Err(ConfigError::Serde(_))));
    }

    #[test]
    fn empty_id_field_is_invalid() {
        let parsed = EngineConfig::from_json_str(r#"{"id_field": ""}"#);
        assert!(matches!(parsed, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn json_round_trip() {
        let config = EngineConfig::default().with_seed(7).with_id_field("uuid");
        let text = config.to_json_string();
        let back = text.as_deref().map(EngineConfig::from_json_str);
        assert!(matches!(back, Ok(Ok(c)) if c == config));
    }
}
