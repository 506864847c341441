//! Scenario tests against in-memory package manager, host and bridge

use async_trait::async_trait;
use mlprobe_errors::{Error, HostError};
use mlprobe_events::{AppEvent, ScenarioEvent};
use mlprobe_host::{EngineBridge, HostRuntime, HostSeams, PackageManager};
use mlprobe_types::{
    CleanupPolicy, CommandResult, HostVersion, InstalledPackage, MatchMode, PackageSpec,
    ScenarioFailure, ScenarioKind, ScenarioOutcome, ScenarioPhase,
};
use mlprobe_verifier::{run_scenarios, CleanupGuard, InstallVerifier, VerifierSettings};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct PmState {
    installed: Option<String>,
    install_calls: Vec<String>,
    uninstall_calls: usize,
}

struct FakePackageManager {
    state: Mutex<PmState>,
    /// Version a successful install ends up with
    available: String,
    install_exit: i32,
    uninstall_exit: i32,
    /// Whether a successful uninstall actually removes the package
    uninstall_removes: bool,
}

impl FakePackageManager {
    fn new(available: &str) -> Self {
        Self {
            state: Mutex::new(PmState::default()),
            available: available.to_string(),
            install_exit: 0,
            uninstall_exit: 0,
            uninstall_removes: true,
        }
    }

    fn install_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().install_calls.clone()
    }

    fn uninstall_calls(&self) -> usize {
        self.state.lock().unwrap().uninstall_calls
    }

    fn is_present(&self) -> bool {
        self.state.lock().unwrap().installed.is_some()
    }
}

#[async_trait]
impl PackageManager for FakePackageManager {
    fn install_command(&self, spec: &PackageSpec) -> String {
        format!("pip install {}", spec.requirement())
    }

    fn uninstall_command(&self, name: &str) -> String {
        format!("pip uninstall -y {name}")
    }

    async fn install(&self, spec: &PackageSpec) -> Result<CommandResult, Error> {
        let mut state = self.state.lock().unwrap();
        state.install_calls.push(spec.requirement());
        if self.install_exit != 0 {
            return Ok(CommandResult::new(
                self.install_exit,
                "ERROR: No matching distribution found for matlabengine==9.99.*\n",
            ));
        }
        state.installed = Some(self.available.clone());
        Ok(CommandResult::new(0, "Successfully installed matlabengine\n"))
    }

    async fn uninstall(&self, _name: &str) -> Result<CommandResult, Error> {
        let mut state = self.state.lock().unwrap();
        state.uninstall_calls += 1;
        if self.uninstall_exit != 0 {
            return Ok(CommandResult::new(
                self.uninstall_exit,
                "ERROR: Cannot uninstall matlabengine\n",
            ));
        }
        if self.uninstall_removes {
            state.installed = None;
        }
        Ok(CommandResult::new(0, "Successfully uninstalled matlabengine\n"))
    }

    async fn installed(&self, name: &str) -> Result<Option<InstalledPackage>, Error> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .installed
            .clone()
            .map(|version| InstalledPackage {
                name: name.to_string(),
                version,
            }))
    }
}

struct FakeHost {
    version: Result<HostVersion, String>,
    shared: Mutex<String>,
    share_calls: Mutex<usize>,
}

impl FakeHost {
    fn new(output: &str) -> Self {
        Self {
            version: Ok(HostVersion::parse(output).unwrap()),
            shared: Mutex::new(String::new()),
            share_calls: Mutex::new(0),
        }
    }

    fn broken() -> Self {
        Self {
            version: Err("License checkout failed.".to_string()),
            shared: Mutex::new(String::new()),
            share_calls: Mutex::new(0),
        }
    }

    fn already_shared(self, name: &str) -> Self {
        *self.shared.lock().unwrap() = name.to_string();
        self
    }
}

#[async_trait]
impl HostRuntime for FakeHost {
    async fn version(&self) -> Result<HostVersion, Error> {
        self.version.clone().map_err(|output| {
            HostError::VersionQueryFailed {
                exit_code: 1,
                output,
            }
            .into()
        })
    }

    async fn engine_name(&self) -> Result<String, Error> {
        Ok(self.shared.lock().unwrap().clone())
    }

    async fn share_engine(&self, name: &str) -> Result<(), Error> {
        *self.share_calls.lock().unwrap() += 1;
        *self.shared.lock().unwrap() = name.to_string();
        Ok(())
    }
}

/// Reports the host's shared name (plus `suffix`) once `hidden_polls`
/// discovery calls have passed
struct FakeBridge {
    host: Arc<FakeHost>,
    suffix: String,
    hidden_polls: usize,
    calls: Mutex<usize>,
}

impl FakeBridge {
    fn mirroring(host: Arc<FakeHost>, suffix: &str) -> Self {
        Self {
            host,
            suffix: suffix.to_string(),
            hidden_polls: 0,
            calls: Mutex::new(0),
        }
    }

    fn appearing_after(mut self, polls: usize) -> Self {
        self.hidden_polls = polls;
        self
    }
}

#[async_trait]
impl EngineBridge for FakeBridge {
    async fn find_sessions(&self) -> Result<Vec<String>, Error> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls <= self.hidden_polls {
            return Ok(Vec::new());
        }
        let name = self.host.shared.lock().unwrap().clone();
        if name.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![format!("{name}{}", self.suffix)])
        }
    }
}

struct Harness {
    pm: Arc<FakePackageManager>,
    host: Arc<FakeHost>,
    verifier: InstallVerifier,
}

fn harness_with(
    pm: FakePackageManager,
    host: FakeHost,
    bridge: impl FnOnce(Arc<FakeHost>) -> FakeBridge,
    tweak: impl FnOnce(&mut VerifierSettings),
) -> Harness {
    let pm = Arc::new(pm);
    let host = Arc::new(host);
    let bridge = Arc::new(bridge(host.clone()));
    let mut settings = VerifierSettings::default();
    tweak(&mut settings);
    let seams = HostSeams::new(pm.clone(), host.clone(), bridge);
    Harness {
        pm,
        host,
        verifier: InstallVerifier::new(settings, seams, None),
    }
}

fn harness(host_output: &str, available: &str) -> Harness {
    harness_with(
        FakePackageManager::new(available),
        FakeHost::new(host_output),
        |host| FakeBridge::mirroring(host, ""),
        |_| {},
    )
}

#[tokio::test(start_paused = true)]
async fn test_no_version_on_expected_release() {
    let h = harness("9.14.0.2206163 (R2023a)", "9.14.3");
    let report = h.verifier.run_scenario(ScenarioKind::NoVersion).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed, "{:?}", report.failures);
    assert_eq!(h.pm.install_calls(), vec!["matlabengine".to_string()]);
    assert_eq!(report.session_name.as_deref(), Some("MATLAB_tInstall"));
    assert_eq!(report.discovered, vec!["MATLAB_tInstall".to_string()]);
    assert_eq!(report.uninstall.as_ref().map(|r| r.exit_code), Some(0));
    assert_eq!(
        report.phases,
        vec![
            ScenarioPhase::Start,
            ScenarioPhase::Installing,
            ScenarioPhase::Installed,
            ScenarioPhase::Verifying,
            ScenarioPhase::Verified,
            ScenarioPhase::CleaningUp,
            ScenarioPhase::Done,
        ]
    );
    assert!(!h.pm.is_present());
}

#[tokio::test(start_paused = true)]
async fn test_matching_engine_pins_host_version() {
    let h = harness("9.14.0.2206163 (R2023a)", "9.14.3");
    let report = h.verifier.run_scenario(ScenarioKind::MatchingEngine).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed, "{:?}", report.failures);
    assert_eq!(h.pm.install_calls(), vec!["matlabengine==9.14.*".to_string()]);
    assert!(report.installed_version.unwrap().starts_with("9.14"));
    assert!(!h.pm.is_present());
}

#[tokio::test(start_paused = true)]
async fn test_no_version_skipped_on_other_release() {
    let h = harness("9.15.0.2249021 (R2023b)", "9.15.0");
    let report = h.verifier.run_scenario(ScenarioKind::NoVersion).await;

    assert!(matches!(report.outcome, ScenarioOutcome::Skipped { .. }));
    assert!(h.pm.install_calls().is_empty());
    assert_eq!(h.pm.uninstall_calls(), 0);
    assert_eq!(report.phases, vec![ScenarioPhase::Start, ScenarioPhase::Skipped]);
}

#[tokio::test(start_paused = true)]
async fn test_install_failure_still_cleans_up() {
    let mut pm = FakePackageManager::new("9.14.3");
    pm.install_exit = 1;
    let h = harness_with(
        pm,
        FakeHost::new("9.14.0.2206163 (R2023a)"),
        |host| FakeBridge::mirroring(host, ""),
        |_| {},
    );
    let report = h.verifier.run_scenario(ScenarioKind::MatchingEngine).await;

    assert_eq!(report.outcome, ScenarioOutcome::Failed);
    match &report.failures[..] {
        [ScenarioFailure::InstallFailure {
            command,
            exit_code,
            output,
        }] => {
            assert_eq!(command, "pip install matlabengine==9.14.*");
            assert_eq!(*exit_code, 1);
            assert!(output.contains("No matching distribution"));
        }
        other => panic!("unexpected failures: {other:?}"),
    }
    assert_eq!(h.pm.uninstall_calls(), 1);
    assert!(report.phases.contains(&ScenarioPhase::InstallFailed));
    assert_eq!(report.phase(), ScenarioPhase::Done);
}

#[tokio::test(start_paused = true)]
async fn test_inline_policy_skips_cleanup_on_failure() {
    let mut pm = FakePackageManager::new("9.14.3");
    pm.install_exit = 1;
    let h = harness_with(
        pm,
        FakeHost::new("9.14.0.2206163 (R2023a)"),
        |host| FakeBridge::mirroring(host, ""),
        |s| s.cleanup_policy = CleanupPolicy::Inline,
    );
    let report = h.verifier.run_scenario(ScenarioKind::NoVersion).await;

    assert_eq!(report.outcome, ScenarioOutcome::Failed);
    assert_eq!(h.pm.uninstall_calls(), 0);
    assert_eq!(report.phase(), ScenarioPhase::InstallFailed);
}

#[tokio::test(start_paused = true)]
async fn test_inline_policy_cleans_up_on_success() {
    let h = harness_with(
        FakePackageManager::new("9.14.3"),
        FakeHost::new("9.14.0.2206163 (R2023a)"),
        |host| FakeBridge::mirroring(host, ""),
        |s| s.cleanup_policy = CleanupPolicy::Inline,
    );
    let report = h.verifier.run_scenario(ScenarioKind::NoVersion).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(h.pm.uninstall_calls(), 1);
    assert!(!h.pm.is_present());
}

#[tokio::test(start_paused = true)]
async fn test_match_modes() {
    let substring = harness_with(
        FakePackageManager::new("9.14.3"),
        FakeHost::new("9.14.0.2206163 (R2023a)"),
        |host| FakeBridge::mirroring(host, "_1"),
        |_| {},
    );
    let report = substring.verifier.run_scenario(ScenarioKind::NoVersion).await;
    assert_eq!(report.outcome, ScenarioOutcome::Passed);

    let strict = harness_with(
        FakePackageManager::new("9.14.3"),
        FakeHost::new("9.14.0.2206163 (R2023a)"),
        |host| FakeBridge::mirroring(host, "_1"),
        |s| s.match_mode = MatchMode::Strict,
    );
    let report = strict.verifier.run_scenario(ScenarioKind::NoVersion).await;
    assert_eq!(report.outcome, ScenarioOutcome::Failed);
    assert_eq!(
        report.failures,
        vec![ScenarioFailure::VerificationMismatch {
            expected: "MATLAB_tInstall".to_string(),
            discovered: vec!["MATLAB_tInstall_1".to_string()],
            mode: MatchMode::Strict,
        }]
    );
    // Verification failed, cleanup still ran
    assert!(!strict.pm.is_present());
}

#[tokio::test(start_paused = true)]
async fn test_uninstall_failure_does_not_mask_mismatch() {
    let mut pm = FakePackageManager::new("9.14.3");
    pm.uninstall_exit = 1;
    let h = harness_with(
        pm,
        FakeHost::new("9.14.0.2206163 (R2023a)"),
        |host| FakeBridge::mirroring(host, "_1"),
        |s| s.match_mode = MatchMode::Strict,
    );
    let report = h.verifier.run_scenario(ScenarioKind::NoVersion).await;

    let labels: Vec<_> = report.failures.iter().map(ScenarioFailure::label).collect();
    assert_eq!(
        labels,
        vec!["verification_mismatch", "uninstall_failure", "still_installed"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_still_installed_after_cleanup() {
    let mut pm = FakePackageManager::new("9.14.3");
    pm.uninstall_removes = false;
    let h = harness_with(
        pm,
        FakeHost::new("9.14.0.2206163 (R2023a)"),
        |host| FakeBridge::mirroring(host, ""),
        |_| {},
    );
    let report = h.verifier.run_scenario(ScenarioKind::NoVersion).await;

    assert_eq!(
        report.failures,
        vec![ScenarioFailure::StillInstalled {
            package: "matlabengine".to_string()
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_version_mismatch() {
    let h = harness("9.14.0.2206163 (R2023a)", "9.15.0");
    let report = h.verifier.run_scenario(ScenarioKind::MatchingEngine).await;

    assert_eq!(
        report.failures,
        vec![ScenarioFailure::VersionMismatch {
            constraint: "==9.14.*".to_string(),
            installed: Some("9.15.0".to_string()),
        }]
    );
    assert!(report.phases.contains(&ScenarioPhase::VerifyFailed));
    assert!(!h.pm.is_present());
}

#[tokio::test(start_paused = true)]
async fn test_discovery_is_polled() {
    let h = harness_with(
        FakePackageManager::new("9.14.3"),
        FakeHost::new("9.14.0.2206163 (R2023a)"),
        |host| FakeBridge::mirroring(host, "").appearing_after(3),
        |_| {},
    );
    let report = h.verifier.run_scenario(ScenarioKind::NoVersion).await;
    assert_eq!(report.outcome, ScenarioOutcome::Passed, "{:?}", report.failures);
}

#[tokio::test(start_paused = true)]
async fn test_discovery_times_out() {
    let h = harness_with(
        FakePackageManager::new("9.14.3"),
        FakeHost::new("9.14.0.2206163 (R2023a)"),
        |host| FakeBridge::mirroring(host, "").appearing_after(usize::MAX),
        |s| {
            s.discovery_timeout = Duration::from_secs(5);
            s.poll_interval = Duration::from_secs(1);
        },
    );
    let report = h.verifier.run_scenario(ScenarioKind::NoVersion).await;

    assert!(matches!(
        &report.failures[..],
        [ScenarioFailure::VerificationMismatch { discovered, .. }] if discovered.is_empty()
    ));
    assert!(!h.pm.is_present());
}

#[tokio::test(start_paused = true)]
async fn test_existing_session_name_is_reused() {
    let h = harness_with(
        FakePackageManager::new("9.14.3"),
        FakeHost::new("9.14.0.2206163 (R2023a)").already_shared("MATLAB_12345"),
        |host| FakeBridge::mirroring(host, ""),
        |_| {},
    );
    let report = h.verifier.run_scenario(ScenarioKind::NoVersion).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(report.session_name.as_deref(), Some("MATLAB_12345"));
    assert_eq!(*h.host.share_calls.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_session_published_once_across_scenarios() {
    let h = harness("9.14.0.2206163 (R2023a)", "9.14.3");
    h.verifier.run_scenario(ScenarioKind::NoVersion).await;
    h.verifier.run_scenario(ScenarioKind::MatchingEngine).await;

    assert_eq!(*h.host.share_calls.lock().unwrap(), 1);
    assert_eq!(*h.host.shared.lock().unwrap(), "MATLAB_tInstall");
}

#[tokio::test(start_paused = true)]
async fn test_host_query_failure_is_a_fault() {
    let h = harness_with(
        FakePackageManager::new("9.14.3"),
        FakeHost::broken(),
        |host| FakeBridge::mirroring(host, ""),
        |_| {},
    );
    let report = h.verifier.run_scenario(ScenarioKind::MatchingEngine).await;

    assert_eq!(report.outcome, ScenarioOutcome::Failed);
    assert!(matches!(
        &report.failures[..],
        [ScenarioFailure::Fault { step: ScenarioPhase::Start, code: Some(code), .. }]
            if code == "host.version_query_failed"
    ));
    assert!(h.pm.install_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_run_scenarios_summary_and_events() {
    let (tx, mut rx) = mlprobe_events::channel();
    let pm = Arc::new(FakePackageManager::new("9.15.0"));
    let host = Arc::new(FakeHost::new("9.15.0.2249021 (R2023b)"));
    let bridge = Arc::new(FakeBridge::mirroring(host.clone(), ""));
    let verifier = InstallVerifier::new(
        VerifierSettings::default(),
        HostSeams::new(pm.clone(), host, bridge),
        Some(tx),
    );

    let summary = run_scenarios(&verifier, &ScenarioKind::ALL).await;
    assert_eq!((summary.passed, summary.failed, summary.skipped), (1, 0, 1));
    assert!(summary.all_ok());
    assert_eq!(pm.install_calls(), vec!["matlabengine==9.15.*".to_string()]);

    drop(verifier);
    let mut finished = 0;
    let mut skipped = 0;
    while let Some(event) = rx.recv().await {
        match event {
            AppEvent::Scenario(ScenarioEvent::Finished { .. }) => finished += 1,
            AppEvent::Scenario(ScenarioEvent::Skipped { .. }) => skipped += 1,
            _ => {}
        }
    }
    assert_eq!((finished, skipped), (2, 1));
}

#[tokio::test]
async fn test_dropped_guard_uninstalls_in_background() {
    let pm = Arc::new(FakePackageManager::new("9.14.3"));
    pm.install(&PackageSpec::latest("matlabengine")).await.unwrap();

    let guard = CleanupGuard::arm(pm.clone(), "matlabengine");
    drop(guard);

    for _ in 0..100 {
        if pm.uninstall_calls() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(pm.uninstall_calls(), 1);
    assert!(!pm.is_present());
}

#[tokio::test]
async fn test_finished_guard_does_not_uninstall_twice() {
    let pm = Arc::new(FakePackageManager::new("9.14.3"));
    let guard = CleanupGuard::arm(pm.clone(), "matlabengine");
    let result = guard.finish().await.unwrap();
    assert!(result.success());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(pm.uninstall_calls(), 1);
}
