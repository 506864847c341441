//! Package manager error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PackageManagerError {
    #[error("invalid package name: {name}")]
    InvalidName { name: String },

    #[error("unparseable `show` output for {package}: {output}")]
    UnparseableShowOutput { package: String, output: String },
}

impl UserFacingError for PackageManagerError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidName { .. } => {
                Some("Package names may contain letters, digits, '.', '-' and '_' only.")
            }
            Self::UnparseableShowOutput { .. } => {
                Some("Check that the configured package manager is pip compatible.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidName { .. } => "package.invalid_name",
            Self::UnparseableShowOutput { .. } => "package.unparseable_show_output",
        };
        Some(code)
    }
}
