#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for mlprobe
//!
//! Configuration is loaded and merged from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/mlprobe/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod core;

pub use crate::core::{
    BridgeConfig, GeneralConfig, HostConfig, PackageConfig, ProcessConfig, VerifyConfig,
};

use mlprobe_errors::{ConfigError, Error};
use mlprobe_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub package: PackageConfig,

    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub verify: VerifyConfig,

    #[serde(default)]
    pub process: ProcessConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::CONFIG_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME))
    }

    /// Directory debug log files are written to
    #[must_use]
    pub fn log_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join(constants::CONFIG_DIR_NAME)
            .join("logs")
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or fails validation.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or parsed.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: &Option<PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // MLPROBE_OUTPUT
        if let Ok(output) = std::env::var("MLPROBE_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "MLPROBE_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        // MLPROBE_COLOR
        if let Ok(color) = std::env::var("MLPROBE_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "MLPROBE_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // MLPROBE_PACKAGE
        if let Ok(name) = std::env::var("MLPROBE_PACKAGE") {
            self.package.name = name;
        }

        // MLPROBE_EXPECTED_RELEASE
        if let Ok(release) = std::env::var("MLPROBE_EXPECTED_RELEASE") {
            self.host.expected_release =
                release.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "MLPROBE_EXPECTED_RELEASE".to_string(),
                    value: release,
                })?;
        }

        // MLPROBE_MATCH_MODE
        if let Ok(mode) = std::env::var("MLPROBE_MATCH_MODE") {
            self.verify.match_mode = mode.parse().map_err(|value| ConfigError::InvalidValue {
                field: "MLPROBE_MATCH_MODE".to_string(),
                value,
            })?;
        }

        // MLPROBE_MATLAB
        if let Ok(matlab) = std::env::var("MLPROBE_MATLAB") {
            self.host.matlab = PathBuf::from(matlab);
        }

        // MLPROBE_PYTHON
        if let Ok(python) = std::env::var("MLPROBE_PYTHON") {
            self.bridge.python = PathBuf::from(python);
        }

        self.validate()
    }

    /// Check cross-field invariants
    ///
    /// # Errors
    ///
    /// Returns an error for an empty package name, session name or
    /// package manager command, or a zero poll interval.
    pub fn validate(&self) -> Result<(), Error> {
        if self.package.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "package.name must not be empty".to_string(),
            }
            .into());
        }
        if self.package.manager.is_empty() {
            return Err(ConfigError::Invalid {
                message: "package.manager must name a program".to_string(),
            }
            .into());
        }
        if self.verify.session_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "verify.session_name must not be empty".to_string(),
            }
            .into());
        }
        if self.verify.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "verify.poll_interval_ms".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Per-command timeout, if configured
    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        self.process.command_timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.verify.discovery_timeout_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.verify.poll_interval_ms)
    }
}
