//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields so
//! the JSON debug log carries everything the terminal showed, and more.

use mlprobe_events::{AppEvent, GeneralEvent, ProcessEvent, ScenarioEvent};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` at its own level with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    match event {
        AppEvent::General(general) => match general {
            GeneralEvent::Warning { message, context } => {
                warn!(target: "mlprobe::events::general", context = ?context, "{message}");
            }
            GeneralEvent::Error { message, details } => {
                error!(target: "mlprobe::events::general", details = ?details, "{message}");
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(target: "mlprobe::events::general", context = ?context, "{message}");
            }
            GeneralEvent::OperationStarted { operation } => {
                info!(target: "mlprobe::events::general", operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(
                    target: "mlprobe::events::general",
                    operation = %operation,
                    success = success,
                    "Operation completed"
                );
            }
        },

        AppEvent::Process(process) => match process {
            ProcessEvent::Started { program, args, cwd } => {
                debug!(
                    target: "mlprobe::events::process",
                    program = %program,
                    args = ?args,
                    cwd = ?cwd,
                    "Process started"
                );
            }
            ProcessEvent::Completed {
                program,
                exit_code,
                duration_ms,
                output_bytes,
            } => {
                if *exit_code == 0 {
                    debug!(
                        target: "mlprobe::events::process",
                        program = %program,
                        exit_code = exit_code,
                        duration_ms = duration_ms,
                        output_bytes = output_bytes,
                        "Process completed"
                    );
                } else {
                    warn!(
                        target: "mlprobe::events::process",
                        program = %program,
                        exit_code = exit_code,
                        duration_ms = duration_ms,
                        output_bytes = output_bytes,
                        "Process exited non-zero"
                    );
                }
            }
            ProcessEvent::Failed {
                program,
                failure,
                duration_ms,
            } => {
                error!(
                    target: "mlprobe::events::process",
                    program = %program,
                    duration_ms = duration_ms,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Process failed"
                );
            }
        },

        AppEvent::Scenario(scenario) => match scenario {
            ScenarioEvent::Started { scenario_id, kind } => {
                info!(
                    target: "mlprobe::events::scenario",
                    scenario_id = %scenario_id,
                    kind = %kind,
                    "Scenario started"
                );
            }
            ScenarioEvent::PhaseChanged {
                scenario_id,
                from,
                to,
            } => {
                debug!(
                    target: "mlprobe::events::scenario",
                    scenario_id = %scenario_id,
                    from = %from,
                    to = %to,
                    "Scenario phase changed"
                );
            }
            ScenarioEvent::Skipped {
                scenario_id,
                kind,
                reason,
            } => {
                warn!(
                    target: "mlprobe::events::scenario",
                    scenario_id = %scenario_id,
                    kind = %kind,
                    reason = %reason,
                    "Scenario skipped"
                );
            }
            ScenarioEvent::SessionPublished { name } => {
                info!(target: "mlprobe::events::scenario", session = %name, "Session published");
            }
            ScenarioEvent::SessionsDiscovered { names } => {
                debug!(target: "mlprobe::events::scenario", sessions = ?names, "Sessions discovered");
            }
            ScenarioEvent::FailureRecorded {
                scenario_id,
                failure,
            } => {
                error!(
                    target: "mlprobe::events::scenario",
                    scenario_id = %scenario_id,
                    failure = failure.label(),
                    "{failure}"
                );
            }
            ScenarioEvent::Finished {
                scenario_id,
                kind,
                outcome,
                duration_ms,
            } => {
                if outcome.is_failed() {
                    error!(
                        target: "mlprobe::events::scenario",
                        scenario_id = %scenario_id,
                        kind = %kind,
                        duration_ms = duration_ms,
                        "Scenario failed"
                    );
                } else {
                    info!(
                        target: "mlprobe::events::scenario",
                        scenario_id = %scenario_id,
                        kind = %kind,
                        outcome = %outcome,
                        duration_ms = duration_ms,
                        "Scenario finished"
                    );
                }
            }
        },
    }
}
