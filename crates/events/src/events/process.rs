//! External process execution events

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Lifecycle of one external command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ProcessEvent {
    /// Process spawned
    Started {
        /// Program being executed
        program: String,
        /// Command arguments
        args: Vec<String>,
        /// Working directory (if set)
        cwd: Option<PathBuf>,
    },

    /// Process exited, successfully or not
    Completed {
        program: String,
        /// Exit code, `-1` when killed by a signal
        exit_code: i32,
        duration_ms: u64,
        /// Size of the combined output in bytes
        output_bytes: u64,
    },

    /// Process could not be spawned or waited on
    Failed {
        program: String,
        failure: FailureContext,
        duration_ms: u64,
    },
}
