//! Shared-session registry errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("session already shared as {current}, cannot rename to {requested}")]
    AlreadyShared { current: String, requested: String },

    #[error("session name must not be empty")]
    EmptyName,
}

impl UserFacingError for SessionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::AlreadyShared { .. } => {
                Some("A shared session keeps its name for the life of the process.")
            }
            Self::EmptyName => Some("Set verify.session_name to a non-empty value."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::AlreadyShared { .. } => "session.already_shared",
            Self::EmptyName => "session.empty_name",
        };
        Some(code)
    }
}
