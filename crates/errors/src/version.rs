//! Version, release and constraint parsing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum VersionError {
    #[error("invalid version: {input}")]
    InvalidVersion { input: String },

    #[error("invalid version constraint: {input}")]
    InvalidConstraint { input: String },

    #[error("invalid release identifier: {input}")]
    InvalidRelease { input: String },

    #[error("constraint {constraint} is not a prefix of host version {version}")]
    NotHostPrefix { constraint: String, version: String },
}

impl UserFacingError for VersionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidVersion { .. } => {
                Some("Use dotted numeric versions such as 9.14 or 9.14.0.2206163.")
            }
            Self::InvalidConstraint { .. } => {
                Some("Use an exact pin (==9.14.3) or a wildcard pin (==9.14.*).")
            }
            Self::InvalidRelease { .. } => Some("Release identifiers look like R2023a or R2023b."),
            Self::NotHostPrefix { .. } => {
                Some("Pin the package to a version that matches the installed host runtime.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidVersion { .. } => "version.invalid_version",
            Self::InvalidConstraint { .. } => "version.invalid_constraint",
            Self::InvalidRelease { .. } => "version.invalid_release",
            Self::NotHostPrefix { .. } => "version.not_host_prefix",
        };
        Some(code)
    }
}
