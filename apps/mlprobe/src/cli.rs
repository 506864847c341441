//! Command line interface definition

use clap::{Parser, Subcommand, ValueEnum};
use mlprobe_types::{ColorChoice, ScenarioKind};
use std::path::PathBuf;

/// mlprobe - install, verify and clean up the MATLAB Engine for Python
#[derive(Parser)]
#[command(name = "mlprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install, verify and clean up the MATLAB Engine for Python")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write debug logs to the state directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH", env = "MLPROBE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Which scenarios `run` executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioSelection {
    /// Unpinned install, only on the expected host release
    NoVersion,
    /// Install pinned to the host's major.minor version
    MatchingEngine,
    All,
}

impl ScenarioSelection {
    pub fn kinds(self) -> Vec<ScenarioKind> {
        match self {
            Self::NoVersion => vec![ScenarioKind::NoVersion],
            Self::MatchingEngine => vec![ScenarioKind::MatchingEngine],
            Self::All => ScenarioKind::ALL.to_vec(),
        }
    }
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Install the package, verify it and uninstall it again
    Run {
        /// Scenario to run
        #[arg(long, value_enum, default_value = "all")]
        scenario: ScenarioSelection,

        /// Require the discovered session name to equal the published one
        #[arg(long)]
        strict: bool,

        /// Only clean up when verification succeeded
        #[arg(long)]
        inline_cleanup: bool,
    },

    /// Show the host version, release and the derived version pin
    HostInfo,

    /// Show whether the package is installed and its version
    Status,
}
