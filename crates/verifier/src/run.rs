//! Bookkeeping for one scenario: phase transitions, failures and events

use mlprobe_errors::{Error, UserFacingError};
use mlprobe_events::{AppEvent, EventEmitter, EventSender, ScenarioEvent};
use mlprobe_types::{
    CleanupPolicy, ScenarioFailure, ScenarioKind, ScenarioOutcome, ScenarioPhase, ScenarioReport,
};
use std::time::Duration;

pub(crate) struct ScenarioRun {
    report: ScenarioReport,
    events: Option<EventSender>,
}

impl EventEmitter for ScenarioRun {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

impl ScenarioRun {
    pub(crate) fn start(
        kind: ScenarioKind,
        policy: CleanupPolicy,
        events: Option<EventSender>,
    ) -> Self {
        let run = Self {
            report: ScenarioReport::new(kind, policy),
            events,
        };
        run.emit_scenario_started(run.report.id, kind);
        run
    }

    pub(crate) fn report(&self) -> &ScenarioReport {
        &self.report
    }

    pub(crate) fn report_mut(&mut self) -> &mut ScenarioReport {
        &mut self.report
    }

    pub(crate) fn phase(&self) -> ScenarioPhase {
        self.report.phase()
    }

    /// Enter `next`, refusing transitions the state machine does not allow
    pub(crate) fn advance(&mut self, next: ScenarioPhase) -> bool {
        let from = self.phase();
        if !from.can_transition_to(next, self.report.policy) {
            tracing::error!(%from, to = %next, "rejected scenario phase transition");
            return false;
        }
        tracing::debug!(scenario = %self.report.kind, %from, to = %next, "phase changed");
        self.report.phases.push(next);
        self.emit_phase_changed(self.report.id, from, next);
        true
    }

    pub(crate) fn record(&mut self, failure: ScenarioFailure) {
        tracing::warn!(scenario = %self.report.kind, failure = failure.label(), "{failure}");
        self.emit_failure_recorded(self.report.id, failure.clone());
        self.report.failures.push(failure);
    }

    /// Record an infrastructure error raised during the current phase
    pub(crate) fn record_fault(&mut self, error: &Error) {
        let step = self.phase();
        self.record(ScenarioFailure::Fault {
            step,
            code: error.user_code().map(str::to_string),
            message: error.user_message().into_owned(),
        });
    }

    pub(crate) fn skip(&mut self, reason: String) {
        if self.advance(ScenarioPhase::Skipped) {
            tracing::info!(scenario = %self.report.kind, %reason, "scenario skipped");
            self.emit_scenario_skipped(self.report.id, self.report.kind, reason.clone());
            self.report.outcome = ScenarioOutcome::Skipped { reason };
        }
    }

    pub(crate) fn session_published(&self, name: &str) {
        self.emit(AppEvent::Scenario(ScenarioEvent::SessionPublished {
            name: name.to_string(),
        }));
    }

    pub(crate) fn sessions_discovered(&self, names: &[String]) {
        self.emit(AppEvent::Scenario(ScenarioEvent::SessionsDiscovered {
            names: names.to_vec(),
        }));
    }

    /// Settle the outcome and hand back the report
    pub(crate) fn finish(mut self, elapsed: Duration) -> ScenarioReport {
        if !self.report.failures.is_empty() {
            self.report.outcome = ScenarioOutcome::Failed;
        }
        self.report.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.emit_scenario_finished(
            self.report.id,
            self.report.kind,
            self.report.outcome.clone(),
            self.report.duration_ms,
        );
        self.report
    }
}
