use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::serializer::{BUILTIN_RULES, DEFAULT_MAX_ITERABLE_DEPTH};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub serializer: SerializerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// How many iterable payloads may nest inside one another. Plain arrays
    /// and objects are not counted.
    #[serde(default = "default_max_iterable_depth")]
    pub max_iterable_depth: usize,
    /// Built-in replacer rules to register, in consultation order.
    #[serde(default = "default_rules")]
    pub rules: Vec<String>,
}

fn default_max_iterable_depth() -> usize {
    DEFAULT_MAX_ITERABLE_DEPTH
}

fn default_rules() -> Vec<String> {
    BUILTIN_RULES.iter().map(|name| name.to_string()).collect()
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_iterable_depth: default_max_iterable_depth(),
            rules: default_rules(),
        }
    }
}

impl BridgeConfig {
    pub fn default_config() -> Self {
        Self {
            serializer: SerializerConfig::default(),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BridgeConfig = toml::from_str(contents).context("parse bridge config TOML")?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let output = toml::to_string_pretty(self).context("render bridge config TOML")?;
        Ok(output)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read bridge config at {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir {}", parent.display()))?;
        }
        let contents = self.to_toml_string()?;
        fs::write(path, contents)
            .with_context(|| format!("write bridge config at {}", path.display()))?;
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
