use serde::{Deserialize, Serialize};

use mlprobe_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod process;
pub mod scenario;

pub use general::*;
pub use process::*;
pub use scenario::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// External command execution
    Process(ProcessEvent),

    /// Scenario lifecycle and verification results
    Scenario(ScenarioEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Process(ProcessEvent::Failed { .. })
            | Self::Scenario(ScenarioEvent::FailureRecorded { .. }) => Level::ERROR,

            Self::Scenario(ScenarioEvent::Finished { outcome, .. }) if outcome.is_failed() => {
                Level::ERROR
            }

            Self::Process(ProcessEvent::Completed { exit_code, .. }) if *exit_code != 0 => {
                Level::WARN
            }

            Self::General(GeneralEvent::Warning { .. })
            | Self::Scenario(ScenarioEvent::Skipped { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Process(ProcessEvent::Started { .. } | ProcessEvent::Completed { .. })
            | Self::Scenario(ScenarioEvent::PhaseChanged { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "mlprobe::events::general",
            Self::Process(_) => "mlprobe::events::process",
            Self::Scenario(_) => "mlprobe::events::scenario",
        }
    }
}
