//! Sequential execution of several scenarios

use mlprobe_events::EventEmitter;
use mlprobe_types::{RunSummary, ScenarioKind};

use crate::verifier::InstallVerifier;

/// Run `kinds` one after another and summarize the results
pub async fn run_scenarios(verifier: &InstallVerifier, kinds: &[ScenarioKind]) -> RunSummary {
    verifier.emit_operation_started(format!("running {} scenario(s)", kinds.len()));

    let mut reports = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        reports.push(verifier.run_scenario(kind).await);
    }

    let summary = RunSummary::from_reports(reports);
    tracing::info!(
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        "scenario run complete"
    );
    verifier.emit_operation_completed("scenario run", summary.all_ok());
    summary
}
