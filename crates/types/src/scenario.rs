//! Scenario variants, matching rules and the per-scenario state machine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which package spec a scenario installs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// Unpinned install, gated on the host being the expected release
    NoVersion,
    /// Install pinned to the host's own major.minor
    MatchingEngine,
}

impl ScenarioKind {
    pub const ALL: [Self; 2] = [Self::NoVersion, Self::MatchingEngine];
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVersion => write!(f, "no-version"),
            Self::MatchingEngine => write!(f, "matching-engine"),
        }
    }
}

/// How a discovered session name is compared with the expected one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Discovered name must equal the expected name
    Strict,
    /// Discovered name must contain the expected name
    #[default]
    Substring,
}

impl MatchMode {
    #[must_use]
    pub fn matches(self, expected: &str, discovered: &str) -> bool {
        match self {
            Self::Strict => discovered == expected,
            Self::Substring => discovered.contains(expected),
        }
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "substring" => Ok(Self::Substring),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Substring => write!(f, "substring"),
        }
    }
}

/// When the uninstall step runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupPolicy {
    /// Armed at scenario entry, runs on every exit path
    #[default]
    Guaranteed,
    /// Runs only after a successful verification
    Inline,
}

impl FromStr for CleanupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guaranteed" => Ok(Self::Guaranteed),
            "inline" => Ok(Self::Inline),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for CleanupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guaranteed => write!(f, "guaranteed"),
            Self::Inline => write!(f, "inline"),
        }
    }
}

/// States a single scenario moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPhase {
    Start,
    Installing,
    InstallFailed,
    Installed,
    Verifying,
    VerifyFailed,
    Verified,
    CleaningUp,
    Done,
    Skipped,
}

impl ScenarioPhase {
    /// Whether `self -> next` is a legal transition under `policy`.
    ///
    /// Failed states only lead to cleanup when cleanup is guaranteed.
    #[must_use]
    pub fn can_transition_to(self, next: Self, policy: CleanupPolicy) -> bool {
        use ScenarioPhase::{
            CleaningUp, Done, InstallFailed, Installed, Installing, Skipped, Start, Verified,
            VerifyFailed, Verifying,
        };
        match (self, next) {
            (Start, Installing | Skipped)
            | (Installing, InstallFailed | Installed)
            | (Installed, Verifying)
            | (Verifying, VerifyFailed | Verified)
            | (Verified, CleaningUp)
            | (CleaningUp, Done) => true,
            (InstallFailed | VerifyFailed, CleaningUp) => policy == CleanupPolicy::Guaranteed,
            _ => false,
        }
    }
}

impl fmt::Display for ScenarioPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Installing => "installing",
            Self::InstallFailed => "install_failed",
            Self::Installed => "installed",
            Self::Verifying => "verifying",
            Self::VerifyFailed => "verify_failed",
            Self::Verified => "verified",
            Self::CleaningUp => "cleaning_up",
            Self::Done => "done",
            Self::Skipped => "skipped",
        };
        f.write_str(name)
    }
}
