//! Host runtime and bridge error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum HostError {
    #[error("host version query failed (exit {exit_code}): {output}")]
    VersionQueryFailed { exit_code: i32, output: String },

    #[error("unexpected host version output: {output}")]
    UnexpectedVersionOutput { output: String },

    #[error("failed to publish session {name}: {message}")]
    PublishFailed { name: String, message: String },

    #[error("session discovery failed (exit {exit_code}): {output}")]
    DiscoveryFailed { exit_code: i32, output: String },
}

impl UserFacingError for HostError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::VersionQueryFailed { .. } | Self::UnexpectedVersionOutput { .. } => {
                Some("Check host.matlab in the config file points at a working MATLAB executable.")
            }
            Self::PublishFailed { .. } => {
                Some("The host runtime must be able to start in batch mode to share a session.")
            }
            Self::DiscoveryFailed { .. } => {
                Some("The interop package may be installed into a different interpreter than bridge.python.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::DiscoveryFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::VersionQueryFailed { .. } => "host.version_query_failed",
            Self::UnexpectedVersionOutput { .. } => "host.unexpected_version_output",
            Self::PublishFailed { .. } => "host.publish_failed",
            Self::DiscoveryFailed { .. } => "host.discovery_failed",
        };
        Some(code)
    }
}
