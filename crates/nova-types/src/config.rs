use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse relation config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Knobs for the assignability rules that Java tooling disagrees on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct RelationConfig {
    /// Treat a wrapper class (`Integer`) as assignable to its primitive (`int`).
    ///
    /// Off by default: a boxed value is not accepted in a primitive slot.
    #[serde(default)]
    pub allow_unboxing: bool,

    /// Accept widening primitive conversions (`int` → `long`). When disabled, primitives are
    /// only assignable to themselves.
    #[serde(default = "default_true")]
    pub primitive_widening: bool,

    /// Accept raw source types where a parameterized target is expected (`List` → `List<String>`).
    #[serde(default = "default_true")]
    pub unchecked_raw_conversion: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            allow_unboxing: false,
            primitive_widening: true,
            unchecked_raw_conversion: true,
        }
    }
}

impl RelationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(text)?;
        Ok(config)
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RelationConfig)
    }
}
