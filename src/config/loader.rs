// src/config/loader.rs
//! Layered configuration loader
//!
//! Builds an [`AnalysisConfig`] from built-in defaults, overlaid by TOML
//! files in precedence order, overlaid by environment variables of the form
//! `EMG_ANALYTICS__SECTION__FIELD`. The merged result is validated before it
//! is handed out. This is shell-side tooling: the engine itself only ever
//! receives the resulting value.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{constants::paths, AnalysisConfig};
use crate::error::{AnalyticsError, ValidationFailure};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration validation errors: {}", format_failures(.0))]
    ValidationError(Vec<ValidationFailure>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn format_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for AnalyticsError {
    fn from(err: ConfigError) -> Self {
        let source_name = match &err {
            ConfigError::FileNotFound(path) => path.clone(),
            _ => "configuration".to_string(),
        };
        AnalyticsError::Configuration {
            source_name,
            reason: err.to_string(),
        }
    }
}

/// Configuration loader merging defaults, files and environment
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Create loader searching the standard locations
    pub fn new() -> Self {
        Self {
            config_paths: Self::discover_config_paths(),
            env_prefix: paths::ENV_PREFIX.to_string(),
        }
    }

    /// Create loader with custom paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Load configuration from files and the process environment
    pub fn load(&self) -> Result<AnalysisConfig, ConfigError> {
        self.load_with_env(std::env::vars())
    }

    /// Load configuration with an explicit set of environment variables
    pub fn load_with_env<I>(&self, vars: I) -> Result<AnalysisConfig, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged = toml::Value::try_from(AnalysisConfig::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        for config_path in &self.config_paths {
            if !config_path.exists() {
                continue;
            }
            let file_config = Self::load_config_file(config_path)?;
            debug!(path = %config_path.display(), "merging configuration file");
            merge_toml_values(&mut merged, file_config);
        }

        self.apply_environment_overrides(&mut merged, vars);

        let config: AnalysisConfig = merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

        config
            .validate_consistency()
            .map_err(ConfigError::ValidationError)?;

        Ok(config)
    }

    /// Parse and validate a configuration document
    pub fn from_toml_str(content: &str) -> Result<AnalysisConfig, ConfigError> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config
            .validate_consistency()
            .map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Validate a configuration file without loading it
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map(|_| ())
    }

    /// Export a configuration to file
    pub fn export_config<P: AsRef<Path>>(config: &AnalysisConfig, path: P) -> Result<(), ConfigError> {
        let toml_content =
            toml::to_string_pretty(config).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    fn load_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: toml::Value = toml::from_str(&content)?;
        Ok(config)
    }

    fn apply_environment_overrides<I>(&self, config: &mut toml::Value, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = format!("{}{}", self.env_prefix, paths::ENV_SEPARATOR);

        for (key, value) in vars {
            let Some(stripped) = key.strip_prefix(&prefix) else {
                continue;
            };
            let parts: Vec<String> = stripped
                .split(paths::ENV_SEPARATOR)
                .map(|p| p.to_lowercase())
                .collect();
            if parts.iter().any(|p| p.is_empty()) {
                warn!(variable = %key, "ignoring malformed configuration override");
                continue;
            }

            debug!(variable = %key, "applying environment override");
            set_nested_value(config, &parts, parse_env_value(&value));
        }
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        let mut config_paths = Vec::new();

        config_paths.push(PathBuf::from(paths::SYSTEM_CONFIG_DIR).join(paths::CONFIG_FILE_NAME));

        if let Some(home_dir) = dirs::home_dir() {
            config_paths.push(home_dir.join(paths::USER_CONFIG_DIR).join(paths::CONFIG_FILE_NAME));
        }

        config_paths.push(PathBuf::from(paths::CONFIG_FILE_NAME));

        config_paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml_values(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn parse_env_value(value: &str) -> toml::Value {
    if let Ok(int_val) = value.parse::<i64>() {
        toml::Value::Integer(int_val)
    } else if let Ok(float_val) = value.parse::<f64>() {
        toml::Value::Float(float_val)
    } else if let Ok(bool_val) = value.parse::<bool>() {
        toml::Value::Boolean(bool_val)
    } else {
        toml::Value::String(value.to_string())
    }
}

fn set_nested_value(config: &mut toml::Value, parts: &[String], value: toml::Value) {
    let Some((last, parents)) = parts.split_last() else {
        return;
    };

    let mut current = config;
    for part in parents {
        let toml::Value::Table(table) = current else {
            return;
        };
        current = table
            .entry(part.clone())
            .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
    }

    if let toml::Value::Table(table) = current {
        table.insert(last.clone(), value);
    }
}

// Cross-platform directory discovery
mod dirs {
    use std::path::PathBuf;

    pub fn home_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var_os("USERPROFILE").map(PathBuf::from)
        }
        #[cfg(not(target_os = "windows"))]
        {
            std::env::var_os("HOME").map(PathBuf::from)
        }
    }
}
