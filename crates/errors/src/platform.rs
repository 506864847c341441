//! Process execution errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors that can occur while spawning or waiting on external processes
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    #[error("command timed out after {timeout_seconds}s: {command}")]
    Timeout { command: String, timeout_seconds: u64 },

    #[error("empty command line")]
    EmptyCommand,
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandNotFound { .. } => {
                Some("Make sure the program is installed and on PATH, or set its path in the config file.")
            }
            Self::Timeout { .. } => Some(
                "Raise process.command_timeout_secs or check that the command is not waiting for input.",
            ),
            Self::EmptyCommand => Some("Configure a non-empty package manager command."),
            Self::ProcessExecutionFailed { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ProcessExecutionFailed { .. } => "platform.process_execution_failed",
            Self::CommandNotFound { .. } => "platform.command_not_found",
            Self::Timeout { .. } => "platform.timeout",
            Self::EmptyCommand => "platform.empty_command",
        };
        Some(code)
    }
}
