//! Captured result of an external command

use serde::{Deserialize, Serialize};

/// Exit code reported when a process ended without one (killed by signal)
pub const SIGNALLED_EXIT_CODE: i32 = -1;

/// Exit code and combined output of a shell-level invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub exit_code: i32,
    /// stdout followed by stderr, verbatim
    pub output: String,
}

impl CommandResult {
    pub fn new(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    /// Zero is the only success value
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Build from raw process streams, joining stdout and stderr
    #[must_use]
    pub fn from_streams(exit_code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> Self {
        let mut output = String::from_utf8_lossy(stdout).into_owned();
        let stderr = String::from_utf8_lossy(stderr);
        if !stderr.is_empty() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&stderr);
        }
        Self {
            exit_code: exit_code.unwrap_or(SIGNALLED_EXIT_CODE),
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_streams_joins_output() {
        let r = CommandResult::from_streams(
            Some(1),
            b"Collecting matlabengine",
            b"ERROR: No matching distribution\n",
        );
        assert!(!r.success());
        assert_eq!(r.output, "Collecting matlabengine\nERROR: No matching distribution\n");
    }

    #[test]
    fn test_signalled_process() {
        let r = CommandResult::from_streams(None, b"", b"");
        assert_eq!(r.exit_code, SIGNALLED_EXIT_CODE);
        assert!(!r.success());
    }
}
