//! Stat definitions loaded from `[[stats]]` tables

use super::ConfigError;
use crate::addon::stat::StatDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Container for stat definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default)]
    pub stats: Vec<StatDefinition>,
}

impl StatsConfig {
    fn validate(self) -> Result<Vec<StatDefinition>, ConfigError> {
        let mut seen = HashSet::new();
        for stat in &self.stats {
            let invalid = |message: String| ConfigError::Validation {
                message,
                path: None,
            };

            if stat.name.is_empty() {
                return Err(invalid("stat with empty name".to_string()));
            }
            if !seen.insert(stat.name.as_str()) {
                return Err(invalid(format!("duplicate stat '{}'", stat.name)));
            }
            if let (Some(min), Some(max)) = (stat.min, stat.max) {
                if min > max {
                    return Err(invalid(format!(
                        "stat '{}' has min {} above max {}",
                        stat.name, min, max
                    )));
                }
            }
        }
        Ok(self.stats)
    }
}

/// Load stat definitions from a TOML file
pub fn load_stat_definitions(path: &Path) -> Result<Vec<StatDefinition>, ConfigError> {
    let config: StatsConfig = super::load_toml(path)?;
    config.validate().map_err(|e| e.at(path))
}

/// Parse stat definitions from a TOML string
pub fn parse_stat_definitions(toml: &str) -> Result<Vec<StatDefinition>, ConfigError> {
    let config: StatsConfig = super::parse_toml(toml)?;
    config.validate()
}
