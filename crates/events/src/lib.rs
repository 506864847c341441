#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for mlprobe
//!
//! Library crates never print. Everything a user should see travels as an
//! [`AppEvent`] over an unbounded channel to the CLI, which renders it and
//! forwards it to tracing.

pub mod events;
pub use events::{AppEvent, FailureContext, GeneralEvent, ProcessEvent, ScenarioEvent};

use mlprobe_types::{ScenarioFailure, ScenarioKind, ScenarioOutcome, ScenarioPhase, Uuid};
use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implemented by the raw `EventSender` and by any struct that may carry one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit a warning event with context
    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    /// Emit an operation started event
    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    /// Emit an operation completed event
    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }

    fn emit_scenario_started(&self, scenario_id: Uuid, kind: ScenarioKind) {
        self.emit(AppEvent::Scenario(ScenarioEvent::Started { scenario_id, kind }));
    }

    fn emit_phase_changed(&self, scenario_id: Uuid, from: ScenarioPhase, to: ScenarioPhase) {
        self.emit(AppEvent::Scenario(ScenarioEvent::PhaseChanged {
            scenario_id,
            from,
            to,
        }));
    }

    fn emit_scenario_skipped(
        &self,
        scenario_id: Uuid,
        kind: ScenarioKind,
        reason: impl Into<String>,
    ) {
        self.emit(AppEvent::Scenario(ScenarioEvent::Skipped {
            scenario_id,
            kind,
            reason: reason.into(),
        }));
    }

    fn emit_failure_recorded(&self, scenario_id: Uuid, failure: ScenarioFailure) {
        self.emit(AppEvent::Scenario(ScenarioEvent::FailureRecorded {
            scenario_id,
            failure,
        }));
    }

    fn emit_scenario_finished(
        &self,
        scenario_id: Uuid,
        kind: ScenarioKind,
        outcome: ScenarioOutcome,
        duration_ms: u64,
    ) {
        self.emit(AppEvent::Scenario(ScenarioEvent::Finished {
            scenario_id,
            kind,
            outcome,
            duration_ms,
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
