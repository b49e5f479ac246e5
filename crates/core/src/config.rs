use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::product::SizeKey;

/// Engine behavior that used to live in ambient process state. It is passed
/// explicitly into the orchestrator; nothing in the engine reads environment
/// variables or globals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Promotion code that triggers the legacy free-upsize behavior.
    pub legacy_upsize_code: String,
    /// Minimum eligible drink units before the upsize kicks in.
    pub upsize_minimum_units: u32,
    pub upsize_from: SizeKey,
    pub upsize_to: SizeKey,
    /// Emit a debug event per priced line.
    pub trace_lines: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            legacy_upsize_code: "UPSIZE".to_owned(),
            upsize_minimum_units: 5,
            upsize_from: SizeKey::Medium,
            upsize_to: SizeKey::Large,
            trace_lines: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: Option<EngineConfig>,
}

impl EngineConfig {
    /// Loads the `[engine]` table from a TOML file; missing keys fall back
    /// to the legacy production defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_owned(), source })?;
        let file: ConfigFile = toml::from_str(&raw)
            .map_err(|source| ConfigError::ParseFile { path: path.to_owned(), source })?;
        Ok(file.engine.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;
    use crate::domain::product::SizeKey;

    #[test]
    fn defaults_match_the_legacy_production_values() {
        let config = EngineConfig::default();
        assert_eq!(config.legacy_upsize_code, "UPSIZE");
        assert_eq!(config.upsize_minimum_units, 5);
        assert_eq!(config.upsize_from, SizeKey::Medium);
        assert_eq!(config.upsize_to, SizeKey::Large);
    }

    #[test]
    fn partial_toml_table_keeps_defaults_for_missing_keys() {
        let parsed: super::ConfigFile =
            toml::from_str("[engine]\nupsize_minimum_units = 3\n").expect("parse");
        let engine = parsed.engine.expect("engine table");
        assert_eq!(engine.upsize_minimum_units, 3);
        assert_eq!(engine.legacy_upsize_code, "UPSIZE");
    }
}
