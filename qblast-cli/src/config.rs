//! Configuration handling for the qblast CLI
//!
//! Settings come from a `qblast.toml` file; command-line flags override them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use qblast_core::{OutputConfig, OutputFormat, PollConfig, ServiceConfig, WorkflowConfig};

use crate::error::CliError;

pub const CONFIG_FILE_NAME: &str = "qblast.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Result encoding used when `--format` is not given
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Print structured records as JSON instead of a table
    #[serde(default)]
    pub json: bool,
}

fn default_format() -> OutputFormat { OutputFormat::Text }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults.
    ///
    /// Lookup order: explicit path, `./qblast.toml`, the user config
    /// directory, built-in defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(CliError::file_not_found(path.to_path_buf()).into());
            }
            log::info!("Loading configuration from: {}", path.display());
            return Self::load_from_file(path);
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                log::info!("Loading configuration from: {}", candidate.display());
                return Self::load_from_file(&candidate);
            }
        }

        log::debug!("Using default configuration");
        Ok(Self::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("qblast").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default configuration")
    }

    /// The part of the configuration handed to the core workflow
    pub fn workflow(&self) -> WorkflowConfig {
        WorkflowConfig {
            service: self.service.clone(),
            poll: self.poll.clone(),
            output: self.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qblast_core::IncompleteHitPolicy;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.program, "blastn");
        assert_eq!(config.service.database, "nt");
        assert_eq!(config.poll.interval_secs, 10);
        assert_eq!(config.display.format, OutputFormat::Text);
        assert_eq!(config.output.incomplete_hits, IncompleteHitPolicy::Skip);
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.service.email = Some("someone@example.org".to_string());
        config.poll.max_wait_secs = Some(600);
        config.display.format = OutputFormat::Xml;
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded = Config::load_from_file(temp_file.path())?;

        assert_eq!(config, loaded);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[poll]\ninterval_secs = 3\n\n[display]\nformat = \"xml\"\n")?;

        let config = Config::load(Some(&path))?;

        assert_eq!(config.poll.interval_secs, 3);
        assert_eq!(config.poll.max_attempts, PollConfig::default().max_attempts);
        assert_eq!(config.display.format, OutputFormat::Xml);
        assert_eq!(config.service, ServiceConfig::default());
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = Config::load(Some(Path::new("/nonexistent/qblast.toml"))).unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::FileNotFound { .. })));
    }

    #[test]
    fn test_invalid_toml_is_config_error() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        std::fs::write(temp_file.path(), "[poll\ninterval_secs = 3")?;

        let err = Config::load_from_file(temp_file.path()).unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::Config { .. })));
        Ok(())
    }

    #[test]
    fn test_example_toml_generation() -> Result<()> {
        let example = Config::example_toml()?;
        assert!(example.contains("[service]"));
        assert!(example.contains("[poll]"));
        assert!(example.contains("[output]"));
        Ok(())
    }
}
