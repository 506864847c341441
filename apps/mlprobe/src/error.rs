//! CLI error handling

use mlprobe_errors::UserFacingError;
use thiserror::Error;

/// Anything that ends a command with exit status 2
#[derive(Debug, Error)]
pub enum CliError {
    /// Error from one of the library crates, rendered with its code and hint
    #[error("{}", render_user_facing(.0))]
    Ops(#[from] mlprobe_errors::Error),

    #[error("setup error: {0}")]
    Setup(String),

    #[error("could not write output: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Stable code for logs, e.g. `host.discovery_failed`
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Ops(e) => e.user_code().unwrap_or("error"),
            CliError::Setup(_) => "cli.setup",
            CliError::Io(_) => "cli.output",
        }
    }
}

fn render_user_facing(error: &mlprobe_errors::Error) -> String {
    let mut lines = vec![error.user_message().into_owned()];
    if let Some(code) = error.user_code() {
        lines.push(format!("  Code: {code}"));
    }
    if let Some(hint) = error.user_hint() {
        lines.push(format!("  Hint: {hint}"));
    }
    if error.is_retryable() {
        lines.push("  Retry: safe to retry this operation.".to_string());
    }
    lines.join("\n")
}
