//! Configuration
//!
//! Loaded from a JSON file and/or the environment. Every section defaults,
//! so an empty object is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Environment variable overriding the temporary directory
pub const ENV_TMPDIR: &str = "AUDIOFLOW_TMPDIR";

/// Environment variable overriding the source materialization strategy
pub const ENV_MATERIALIZATION: &str = "AUDIOFLOW_MATERIALIZATION";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub flow: FlowConfig,
}

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory for temporary files; system temp dir when unset
    pub temp_dir: Option<PathBuf>,
}

/// How the input buffer is made readable by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Materialization {
    /// Temporary file on macOS or engines without memory streams, memory elsewhere
    #[default]
    Auto,
    TempFile,
    Memory,
}

impl std::str::FromStr for Materialization {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Materialization::Auto),
            "temp_file" | "tempfile" | "file" => Ok(Materialization::TempFile),
            "memory" | "mem" => Ok(Materialization::Memory),
            other => Err(FlowError::InvalidCommand {
                reason: format!("unknown materialization strategy '{}'", other),
            }),
        }
    }
}

/// Effects flow configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub materialization: Materialization,
    /// Keep scanning `rate`/`channels` entries past `no_effects` when
    /// resolving the target signal
    pub resolve_past_sentinel: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            materialization: Materialization::Auto,
            resolve_past_sentinel: true,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `AUDIOFLOW_*` environment overrides on top of this configuration
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var(ENV_TMPDIR).ok(),
            std::env::var(ENV_MATERIALIZATION).ok(),
        )
    }

    fn apply_overrides(
        &mut self,
        temp_dir: Option<String>,
        materialization: Option<String>,
    ) -> Result<()> {
        if let Some(dir) = temp_dir.filter(|d| !d.is_empty()) {
            self.engine.temp_dir = Some(PathBuf::from(dir));
        }
        if let Some(strategy) = materialization.filter(|m| !m.is_empty()) {
            self.flow.materialization = strategy.parse()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.temp_dir, None);
        assert_eq!(config.flow.materialization, Materialization::Auto);
        assert!(config.flow.resolve_past_sentinel);
    }

    #[test]
    fn test_partial_json() {
        let config: Config =
            serde_json::from_str(r#"{"flow": {"materialization": "temp_file"}}"#).unwrap();
        assert_eq!(config.flow.materialization, Materialization::TempFile);
        assert!(config.flow.resolve_past_sentinel);

        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audioflow.json");
        std::fs::write(
            &path,
            r#"{"engine": {"temp_dir": "/var/tmp"}, "flow": {"resolve_past_sentinel": false}}"#,
        )
        .unwrap();

        let config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.engine.temp_dir, Some(PathBuf::from("/var/tmp")));
        assert!(!config.flow.resolve_past_sentinel);
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::from_json_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(Some("/scratch".into()), Some("memory".into()))
            .unwrap();
        assert_eq!(config.engine.temp_dir, Some(PathBuf::from("/scratch")));
        assert_eq!(config.flow.materialization, Materialization::Memory);

        assert!(config.apply_overrides(None, Some("disk".into())).is_err());
    }
}
