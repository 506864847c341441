//! The install-verify-cleanup driver

use mlprobe_errors::{Error, UserFacingError};
use mlprobe_events::{EventEmitter, EventSender};
use mlprobe_host::HostSeams;
use mlprobe_types::{
    CleanupPolicy, CommandResult, HostVersion, PackageSpec, ScenarioFailure, ScenarioKind,
    ScenarioPhase, ScenarioReport, VersionConstraint,
};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::guard::CleanupGuard;
use crate::run::ScenarioRun;
use crate::settings::VerifierSettings;

/// Runs scenarios against the package manager, host and bridge in `seams`.
///
/// Scenarios on one verifier never overlap: each owns the installation of
/// the package for its whole duration.
pub struct InstallVerifier {
    settings: VerifierSettings,
    seams: HostSeams,
    events: Option<EventSender>,
    serial: Mutex<()>,
}

impl EventEmitter for InstallVerifier {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

/// Last thing the bridge told us while polling
enum Discovery {
    Matched(Vec<String>),
    Unmatched(Vec<String>),
    Failed(Error),
}

impl InstallVerifier {
    #[must_use]
    pub fn new(settings: VerifierSettings, seams: HostSeams, events: Option<EventSender>) -> Self {
        Self {
            settings,
            seams,
            events,
            serial: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &VerifierSettings {
        &self.settings
    }

    /// Run one scenario to completion.
    ///
    /// Never fails: install, verification and cleanup problems are recorded
    /// in the returned report in the order they happened.
    pub async fn run_scenario(&self, kind: ScenarioKind) -> ScenarioReport {
        let _serial = self.serial.lock().await;
        let started = std::time::Instant::now();
        tracing::info!(
            scenario = %kind,
            policy = %self.settings.cleanup_policy,
            "starting scenario"
        );

        let mut run = ScenarioRun::start(kind, self.settings.cleanup_policy, self.events.clone());
        self.drive(&mut run).await;

        let report = run.finish(started.elapsed());
        tracing::info!(scenario = %kind, outcome = %report.outcome, "scenario finished");
        report
    }

    async fn drive(&self, run: &mut ScenarioRun) {
        let host = match self.seams.runtime.version().await {
            Ok(host) => host,
            Err(e) => {
                run.record_fault(&e);
                return;
            }
        };
        run.report_mut().host = Some(host.clone());

        let spec = match self.package_spec(run, &host) {
            Ok(Some(spec)) => spec,
            Ok(None) => return,
            Err(e) => {
                run.record_fault(&e);
                return;
            }
        };
        run.report_mut().package = Some(spec.clone());

        let guard = match self.settings.cleanup_policy {
            CleanupPolicy::Guaranteed => Some(CleanupGuard::arm(
                self.seams.package_manager.clone(),
                spec.name.clone(),
            )),
            CleanupPolicy::Inline => None,
        };

        run.advance(ScenarioPhase::Installing);
        if !self.install(run, &spec).await {
            run.advance(ScenarioPhase::InstallFailed);
            if let Some(guard) = guard {
                self.cleanup(run, &spec.name, Some(guard)).await;
            }
            return;
        }
        run.advance(ScenarioPhase::Installed);

        run.advance(ScenarioPhase::Verifying);
        let verified = self.verify(run, &spec).await;
        run.advance(if verified {
            ScenarioPhase::Verified
        } else {
            ScenarioPhase::VerifyFailed
        });

        // Inline cleanup only happens on the success path
        if verified || guard.is_some() {
            self.cleanup(run, &spec.name, guard).await;
        }
    }

    /// Build the `PackageSpec` for `kind`, or `None` when the scenario is skipped
    fn package_spec(
        &self,
        run: &mut ScenarioRun,
        host: &HostVersion,
    ) -> Result<Option<PackageSpec>, Error> {
        match run.report().kind {
            ScenarioKind::NoVersion => {
                if host.release != self.settings.expected_release {
                    run.skip(format!(
                        "host release {} is not {}, the unpinned install only targets that release",
                        host.release, self.settings.expected_release
                    ));
                    return Ok(None);
                }
                Ok(Some(PackageSpec::latest(&self.settings.package)))
            }
            ScenarioKind::MatchingEngine => {
                let constraint = VersionConstraint::wildcard_from_host(&host.version)?;
                let spec = PackageSpec::pinned(&self.settings.package, constraint);
                spec.check_against_host(&host.version)?;
                Ok(Some(spec))
            }
        }
    }

    /// Install `spec`; `false` when the install failed
    async fn install(&self, run: &mut ScenarioRun, spec: &PackageSpec) -> bool {
        let package_manager = &self.seams.package_manager;
        match package_manager.install(spec).await {
            Ok(result) => {
                let ok = result.success();
                if !ok {
                    run.record(ScenarioFailure::InstallFailure {
                        command: package_manager.install_command(spec),
                        exit_code: result.exit_code,
                        output: result.output.clone(),
                    });
                }
                run.report_mut().install = Some(result);
                ok
            }
            Err(e) => {
                run.record_fault(&e);
                false
            }
        }
    }

    /// Round-trip check through the installed package; `false` on any failure
    async fn verify(&self, run: &mut ScenarioRun, spec: &PackageSpec) -> bool {
        let failures_before = run.report().failures.len();

        let name = match self.establish_session(run).await {
            Ok(name) => name,
            Err(e) => {
                run.record_fault(&e);
                return false;
            }
        };
        run.report_mut().session_name = Some(name.clone());

        match self.poll_discovery(&name).await {
            Discovery::Matched(names) => {
                run.sessions_discovered(&names);
                run.report_mut().discovered = names;
            }
            Discovery::Unmatched(names) => {
                run.sessions_discovered(&names);
                run.record(ScenarioFailure::VerificationMismatch {
                    expected: name,
                    discovered: names.clone(),
                    mode: self.settings.match_mode,
                });
                run.report_mut().discovered = names;
            }
            Discovery::Failed(e) => run.record_fault(&e),
        }

        if let Some(constraint) = &spec.version_constraint {
            self.check_installed_version(run, &spec.name, constraint)
                .await;
        }

        run.report().failures.len() == failures_before
    }

    /// Current shared name, publishing the fallback name when unshared
    async fn establish_session(&self, run: &ScenarioRun) -> Result<String, Error> {
        let runtime = &self.seams.runtime;
        let current = runtime.engine_name().await?;
        if !current.is_empty() {
            tracing::debug!(session = %current, "host session already shared");
            return Ok(current);
        }

        let name = self.settings.session_name.clone();
        runtime.share_engine(&name).await?;
        run.session_published(&name);
        Ok(name)
    }

    /// Ask the bridge until `name` shows up or the discovery timeout passes
    async fn poll_discovery(&self, name: &str) -> Discovery {
        let mode = self.settings.match_mode;
        let deadline = Instant::now() + self.settings.discovery_timeout;
        let mut attempt = 0_u32;

        loop {
            attempt += 1;
            let last = match self.seams.bridge.find_sessions().await {
                Ok(names) if names.iter().any(|found| mode.matches(name, found)) => {
                    tracing::debug!(attempt, session = name, "session discovered");
                    return Discovery::Matched(names);
                }
                Ok(names) => Discovery::Unmatched(names),
                Err(e) if !e.is_retryable() => return Discovery::Failed(e),
                Err(e) => Discovery::Failed(e),
            };

            if Instant::now() + self.settings.poll_interval > deadline {
                tracing::debug!(attempt, session = name, "discovery timed out");
                return last;
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    async fn check_installed_version(
        &self,
        run: &mut ScenarioRun,
        package: &str,
        constraint: &VersionConstraint,
    ) {
        match self.seams.package_manager.installed(package).await {
            Ok(Some(installed)) => {
                if !constraint.matches(&installed.version) {
                    run.record(ScenarioFailure::VersionMismatch {
                        constraint: constraint.to_string(),
                        installed: Some(installed.version.clone()),
                    });
                }
                run.report_mut().installed_version = Some(installed.version);
            }
            Ok(None) => run.record(ScenarioFailure::VersionMismatch {
                constraint: constraint.to_string(),
                installed: None,
            }),
            Err(e) => run.record_fault(&e),
        }
    }

    /// Uninstall, then confirm the package is really gone
    async fn cleanup(&self, run: &mut ScenarioRun, package: &str, guard: Option<CleanupGuard>) {
        run.advance(ScenarioPhase::CleaningUp);
        let package_manager = &self.seams.package_manager;

        let result: Result<CommandResult, Error> = match guard {
            Some(guard) => guard.finish().await,
            None => package_manager.uninstall(package).await,
        };

        match result {
            Ok(result) => {
                if !result.success() {
                    run.record(ScenarioFailure::UninstallFailure {
                        command: package_manager.uninstall_command(package),
                        exit_code: result.exit_code,
                        output: result.output.clone(),
                    });
                }
                run.report_mut().uninstall = Some(result);
            }
            Err(e) => run.record_fault(&e),
        }

        match package_manager.is_installed(package).await {
            Ok(true) => run.record(ScenarioFailure::StillInstalled {
                package: package.to_string(),
            }),
            Ok(false) => {}
            Err(e) => run.record_fault(&e),
        }

        run.advance(ScenarioPhase::Done);
    }
}
