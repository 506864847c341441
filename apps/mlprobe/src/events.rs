//! Event handling and user feedback

use console::{style, Term};
use mlprobe_events::{AppEvent, GeneralEvent, ProcessEvent, ScenarioEvent};
use mlprobe_types::ScenarioOutcome;

use crate::logging::log_event_with_tracing;

/// Renders progress to stderr while a command runs
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    debug_enabled: bool,
    /// Suppress all terminal output (JSON mode)
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event_with_tracing(&event);
        if self.quiet {
            return;
        }

        match event {
            AppEvent::General(general) => self.handle_general(general),
            AppEvent::Process(process) => self.handle_process(process),
            AppEvent::Scenario(scenario) => self.handle_scenario(scenario),
        }
    }

    fn handle_general(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => match context {
                Some(context) => self.show_warning(&format!("{message} ({context})")),
                None => self.show_warning(&message),
            },
            GeneralEvent::Error { message, details } => match details {
                Some(details) => self.show_error(&format!("{message}: {details}")),
                None => self.show_error(&message),
            },
            GeneralEvent::DebugLog { message, .. } => self.show_debug(&message),
            GeneralEvent::OperationStarted { operation } => self.show_debug(&operation),
            GeneralEvent::OperationCompleted { .. } => {}
        }
    }

    fn handle_process(&self, event: ProcessEvent) {
        match event {
            ProcessEvent::Started { program, args, .. } => {
                self.show_debug(&format!("$ {program} {}", args.join(" ")));
            }
            ProcessEvent::Completed {
                program,
                exit_code,
                duration_ms,
                ..
            } => {
                self.show_debug(&format!("{program} exited {exit_code} after {duration_ms}ms"));
            }
            ProcessEvent::Failed {
                program, failure, ..
            } => {
                self.show_error(&format!("{program}: {}", failure.message));
                if let Some(hint) = failure.hint {
                    self.show_status(&format!("  hint: {hint}"));
                }
            }
        }
    }

    fn handle_scenario(&self, event: ScenarioEvent) {
        match event {
            ScenarioEvent::Started { kind, .. } => {
                self.show_status(&format!("{} scenario {kind}", self.paint_bold("==>")));
            }
            ScenarioEvent::PhaseChanged { from, to, .. } => {
                self.show_debug(&format!("{from} -> {to}"));
            }
            ScenarioEvent::Skipped { kind, reason, .. } => {
                self.show_warning(&format!("{kind} skipped: {reason}"));
            }
            ScenarioEvent::SessionPublished { name } => {
                self.show_status(&format!("    shared host session as {name}"));
            }
            ScenarioEvent::SessionsDiscovered { names } => {
                self.show_debug(&format!("discovered sessions: {}", names.join(", ")));
            }
            ScenarioEvent::FailureRecorded { failure, .. } => {
                self.show_error(&format!("{}: {failure}", failure.label()));
            }
            ScenarioEvent::Finished {
                kind,
                outcome,
                duration_ms,
                ..
            } => {
                let color = match outcome {
                    ScenarioOutcome::Passed => console::Color::Green,
                    ScenarioOutcome::Failed => console::Color::Red,
                    ScenarioOutcome::Skipped { .. } => console::Color::Yellow,
                };
                let verdict = self.paint(&outcome.to_string(), color);
                self.show_status(&format!("    {kind} {verdict} in {duration_ms}ms"));
            }
        }
    }

    fn paint(&self, text: &str, color: console::Color) -> String {
        if self.colors_enabled {
            style(text).fg(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_bold(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn show_status(&self, message: &str) {
        let _ = self.term.write_line(message);
    }

    fn show_warning(&self, message: &str) {
        let prefix = self.paint("warning:", console::Color::Yellow);
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    fn show_error(&self, message: &str) {
        let prefix = self.paint("error:", console::Color::Red);
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    fn show_debug(&self, message: &str) {
        if self.debug_enabled {
            let line = if self.colors_enabled {
                style(message).dim().to_string()
            } else {
                message.to_string()
            };
            let _ = self.term.write_line(&line);
        }
    }
}
