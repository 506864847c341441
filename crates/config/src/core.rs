//! Configuration sections

use crate::constants::{
    DEFAULT_EXPECTED_RELEASE, DEFAULT_MATLAB, DEFAULT_PACKAGE, DEFAULT_PYTHON,
    DEFAULT_SESSION_NAME,
};
use mlprobe_types::{CleanupPolicy, ColorChoice, MatchMode, OutputFormat, Release};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
        }
    }
}

/// Package under test and the package manager that installs it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    #[serde(default = "default_package_name")]
    pub name: String,
    /// argv prefix, `install`/`uninstall`/`show` are appended
    #[serde(default = "default_manager")]
    pub manager: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: default_package_name(),
            manager: default_manager(),
        }
    }
}

/// Host runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_matlab")]
    pub matlab: PathBuf,
    #[serde(default = "default_expected_release")]
    pub expected_release: Release,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            matlab: default_matlab(),
            expected_release: default_expected_release(),
        }
    }
}

/// Interpreter the interop package is installed into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_python")]
    pub python: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
        }
    }
}

/// Verification step configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    #[serde(default = "default_session_name")]
    pub session_name: String,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub cleanup_policy: CleanupPolicy,
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            session_name: default_session_name(),
            match_mode: MatchMode::default(),
            cleanup_policy: CleanupPolicy::default(),
            discovery_timeout_secs: default_discovery_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// External process configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessConfig {
    /// No timeout when unset
    pub command_timeout_secs: Option<u64>,
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_package_name() -> String {
    DEFAULT_PACKAGE.to_string()
}

fn default_manager() -> Vec<String> {
    vec![DEFAULT_PYTHON.to_string(), "-m".to_string(), "pip".to_string()]
}

fn default_matlab() -> PathBuf {
    PathBuf::from(DEFAULT_MATLAB)
}

fn default_expected_release() -> Release {
    DEFAULT_EXPECTED_RELEASE
        .parse()
        .unwrap_or(Release {
            year: 2023,
            half: mlprobe_types::ReleaseHalf::A,
        })
}

fn default_python() -> PathBuf {
    PathBuf::from(DEFAULT_PYTHON)
}

fn default_session_name() -> String {
    DEFAULT_SESSION_NAME.to_string()
}

fn default_discovery_timeout_secs() -> u64 {
    120 // host startup can be slow
}

fn default_poll_interval_ms() -> u64 {
    1000
}
