#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for mlprobe
//!
//! Package specs and version pins, captured command results, host version
//! parsing and the scenario state machine shared by the verifier and CLI.

pub mod command;
pub mod package;
pub mod reports;
pub mod scenario;
pub mod version;

pub use command::CommandResult;
pub use package::{InstalledPackage, PackageSpec};
pub use reports::{RunSummary, ScenarioFailure, ScenarioOutcome, ScenarioReport};
pub use scenario::{CleanupPolicy, MatchMode, ScenarioKind, ScenarioPhase};
pub use uuid::Uuid;
pub use version::{HostVersion, Release, ReleaseHalf, VersionConstraint};

use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Tty,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Tty
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}
