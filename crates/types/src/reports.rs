//! Scenario reports and run summaries

use crate::command::CommandResult;
use crate::package::PackageSpec;
use crate::scenario::{CleanupPolicy, MatchMode, ScenarioKind, ScenarioPhase};
use crate::version::HostVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A failure recorded against a scenario.
///
/// Failures accumulate in the order they happen so a cleanup failure never
/// hides the verification failure that preceded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioFailure {
    InstallFailure {
        command: String,
        exit_code: i32,
        output: String,
    },
    VerificationMismatch {
        expected: String,
        discovered: Vec<String>,
        mode: MatchMode,
    },
    VersionMismatch {
        constraint: String,
        installed: Option<String>,
    },
    UninstallFailure {
        command: String,
        exit_code: i32,
        output: String,
    },
    StillInstalled {
        package: String,
    },
    /// An infrastructure error while a step ran
    Fault {
        step: ScenarioPhase,
        code: Option<String>,
        message: String,
    },
}

impl ScenarioFailure {
    /// Short stable label for tables and logs
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::InstallFailure { .. } => "install_failure",
            Self::VerificationMismatch { .. } => "verification_mismatch",
            Self::VersionMismatch { .. } => "version_mismatch",
            Self::UninstallFailure { .. } => "uninstall_failure",
            Self::StillInstalled { .. } => "still_installed",
            Self::Fault { .. } => "fault",
        }
    }
}

impl fmt::Display for ScenarioFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstallFailure {
                command,
                exit_code,
                output,
            } => write!(f, "`{command}` exited with {exit_code}:\n{output}"),
            Self::UninstallFailure {
                command,
                exit_code,
                output,
            } => write!(f, "cleanup `{command}` exited with {exit_code}:\n{output}"),
            Self::VerificationMismatch {
                expected,
                discovered,
                mode,
            } => write!(
                f,
                "expected a shared session matching {expected:?} ({mode}), discovered {discovered:?}"
            ),
            Self::VersionMismatch {
                constraint,
                installed,
            } => match installed {
                Some(v) => write!(f, "installed version {v} does not satisfy {constraint}"),
                None => write!(f, "package not reported installed, expected {constraint}"),
            },
            Self::StillInstalled { package } => {
                write!(f, "{package} is still installed after cleanup")
            }
            Self::Fault {
                step,
                code,
                message,
            } => match code {
                Some(code) => write!(f, "{step}: {message} [{code}]"),
                None => write!(f, "{step}: {message}"),
            },
        }
    }
}

/// Final verdict of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Passed,
    Failed,
    /// Assumption not met, the scenario did not run
    Skipped { reason: String },
}

impl ScenarioOutcome {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped { .. } => write!(f, "skipped"),
        }
    }
}

/// Everything observed while running one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub id: Uuid,
    pub kind: ScenarioKind,
    pub package: Option<PackageSpec>,
    pub host: Option<HostVersion>,
    pub policy: CleanupPolicy,
    pub outcome: ScenarioOutcome,
    pub failures: Vec<ScenarioFailure>,
    /// Phases in the order they were entered
    pub phases: Vec<ScenarioPhase>,
    pub install: Option<CommandResult>,
    pub uninstall: Option<CommandResult>,
    pub session_name: Option<String>,
    pub discovered: Vec<String>,
    pub installed_version: Option<String>,
    pub duration_ms: u64,
}

impl ScenarioReport {
    /// Empty report for a scenario that is about to start
    #[must_use]
    pub fn new(kind: ScenarioKind, policy: CleanupPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            package: None,
            host: None,
            policy,
            outcome: ScenarioOutcome::Passed,
            failures: Vec::new(),
            phases: vec![ScenarioPhase::Start],
            install: None,
            uninstall: None,
            session_name: None,
            discovered: Vec::new(),
            installed_version: None,
            duration_ms: 0,
        }
    }

    /// Phase most recently entered
    #[must_use]
    pub fn phase(&self) -> ScenarioPhase {
        self.phases.last().copied().unwrap_or(ScenarioPhase::Start)
    }
}

/// Aggregated result of running several scenarios
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub reports: Vec<ScenarioReport>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    #[must_use]
    pub fn from_reports(reports: Vec<ScenarioReport>) -> Self {
        let mut summary = Self::default();
        for report in &reports {
            match report.outcome {
                ScenarioOutcome::Passed => summary.passed += 1,
                ScenarioOutcome::Failed => summary.failed += 1,
                ScenarioOutcome::Skipped { .. } => summary.skipped += 1,
            }
        }
        summary.reports = reports;
        summary
    }

    /// True when nothing failed; skips do not count against the run
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.failed == 0
    }
}
