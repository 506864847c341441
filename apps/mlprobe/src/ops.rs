//! The commands themselves, independent of rendering

use mlprobe_events::EventSender;
use mlprobe_types::{HostVersion, Release, RunSummary, ScenarioKind, VersionConstraint};
use mlprobe_verifier::{run_scenarios, InstallVerifier, VerifierSettings};
use serde::Serialize;

use crate::error::CliError;
use crate::setup::SystemSetup;

/// Host version plus what the scenarios would derive from it
#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub host: HostVersion,
    pub constraint: VersionConstraint,
    pub expected_release: Release,
    /// Whether the no-version scenario would run on this host
    pub no_version_runs: bool,
}

/// Installation state of the package under test
#[derive(Debug, Clone, Serialize)]
pub struct PackageStatus {
    pub package: String,
    pub installed: bool,
    pub version: Option<String>,
}

/// Result of any command, ready for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OperationResult {
    Run(RunSummary),
    HostInfo(HostInfo),
    Status(PackageStatus),
}

impl OperationResult {
    /// Whether the process should exit with a failure status
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Run(summary) if !summary.all_ok())
    }
}

pub async fn run(
    setup: &SystemSetup,
    kinds: &[ScenarioKind],
    event_sender: EventSender,
) -> Result<OperationResult, CliError> {
    let settings = VerifierSettings::from_config(setup.config());
    let verifier = InstallVerifier::new(settings, setup.seams().clone(), Some(event_sender));
    let summary = run_scenarios(&verifier, kinds).await;
    Ok(OperationResult::Run(summary))
}

pub async fn host_info(setup: &SystemSetup) -> Result<OperationResult, CliError> {
    let host = setup.seams().runtime.version().await?;
    let constraint = VersionConstraint::wildcard_from_host(&host.version)
        .map_err(mlprobe_errors::Error::from)?;
    let expected_release = setup.config().host.expected_release;
    Ok(OperationResult::HostInfo(HostInfo {
        no_version_runs: host.release == expected_release,
        host,
        constraint,
        expected_release,
    }))
}

pub async fn status(setup: &SystemSetup) -> Result<OperationResult, CliError> {
    let package = setup.config().package.name.clone();
    let installed = setup.seams().package_manager.installed(&package).await?;
    Ok(OperationResult::Status(PackageStatus {
        package,
        installed: installed.is_some(),
        version: installed.map(|p| p.version),
    }))
}
