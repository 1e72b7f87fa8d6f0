//! Configuration Management
//!
//! Handles persistent configuration storage for awsrecon.

use crate::aws::auth;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Document format of the CLI output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Default AWS profile
    #[serde(default)]
    pub profile: Option<String>,
    /// Default AWS region
    #[serde(default)]
    pub region: Option<String>,
    /// Default output format
    #[serde(default)]
    pub output: Option<OutputFormat>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("awsrecon").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective profile (CLI > config > AWS_PROFILE > "default")
    pub fn effective_profile(&self) -> String {
        self.profile
            .clone()
            .or_else(auth::get_default_profile)
            .unwrap_or_else(|| auth::DEFAULT_PROFILE.to_string())
    }

    /// Get effective region (CLI > config > environment / ~/.aws/config > us-east-1)
    pub fn effective_region(&self, profile: &str) -> String {
        self.region
            .clone()
            .or_else(|| auth::get_default_region(profile))
            .unwrap_or_else(|| auth::DEFAULT_REGION.to_string())
    }

    pub fn effective_output(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }

    /// Set profile and region and save
    pub fn set_defaults(&mut self, profile: &str, region: &str) -> Result<()> {
        self.profile = Some(profile.to_string());
        self.region = Some(region.to_string());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("awsrecon-test-{}-{}", std::process::id(), name))
            .join("config.json")
    }

    #[test]
    fn test_explicit_values_win() {
        let config = Config {
            profile: Some("production".into()),
            region: Some("eu-west-2".into()),
            output: Some(OutputFormat::Yaml),
        };
        assert_eq!(config.effective_profile(), "production");
        assert_eq!(config.effective_region("production"), "eu-west-2");
        assert_eq!(config.effective_output(), OutputFormat::Yaml);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"region": "us-west-2"}"#).unwrap();
        assert_eq!(config.profile, None);
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
        assert_eq!(config.effective_output(), OutputFormat::Json);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = scratch_path("roundtrip");
        let config = Config {
            profile: Some("sys".into()),
            region: Some("us-east-1".into()),
            output: Some(OutputFormat::Json),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_malformed_file_loads_defaults() {
        let path = scratch_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(Config::load_from(&path), Config::default());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        assert_eq!(
            Config::load_from(Path::new("/nonexistent/awsrecon/config.json")),
            Config::default()
        );
    }
}
