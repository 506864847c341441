#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for mlprobe
//!
//! Errors are grouped by the seam they come from: configuration, version
//! parsing, process execution, the package manager, the host runtime and the
//! shared-session registry. All of them implement `Clone` so scenario reports
//! can keep a copy of the failure that ended a step.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod host;
pub mod package;
pub mod platform;
pub mod session;
pub mod version;

pub use config::ConfigError;
pub use host::HostError;
pub use package::PackageManagerError;
pub use platform::PlatformError;
pub use session::SessionError;
pub use version::VersionError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("version error: {0}")]
    Version(#[from] VersionError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("package manager error: {0}")]
    PackageManager(#[from] PackageManagerError),

    #[error("host runtime error: {0}")]
    Host(#[from] HostError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(ConfigError::ParseError {
            message: err.to_string(),
        })
    }
}

/// Result type alias for mlprobe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Config(err) => err.user_message(),
            Error::Version(err) => err.user_message(),
            Error::Platform(err) => err.user_message(),
            Error::PackageManager(err) => err.user_message(),
            Error::Host(err) => err.user_message(),
            Error::Session(err) => err.user_message(),
            Error::Internal(_) => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_hint(),
            Error::Version(err) => err.user_hint(),
            Error::Platform(err) => err.user_hint(),
            Error::PackageManager(err) => err.user_hint(),
            Error::Host(err) => err.user_hint(),
            Error::Session(err) => err.user_hint(),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Platform(err) => err.is_retryable(),
            Error::PackageManager(err) => err.is_retryable(),
            Error::Host(err) => err.is_retryable(),
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_code(),
            Error::Version(err) => err.user_code(),
            Error::Platform(err) => err.user_code(),
            Error::PackageManager(err) => err.user_code(),
            Error::Host(err) => err.user_code(),
            Error::Session(err) => err.user_code(),
            Error::Internal(_) => Some("error.internal"),
        }
    }
}
