//! Process execution operations

use async_trait::async_trait;
use mlprobe_errors::{Error, PlatformError};
use mlprobe_types::CommandResult;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::PlatformContext;

/// Platform-specific command builder
#[derive(Debug, Clone)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env_vars: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl PlatformCommand {
    /// Create a new platform command
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            timeout: None,
        }
    }

    /// Build a command from an argv list such as `["python3", "-m", "pip"]`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::EmptyCommand` if `argv` is empty.
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Result<Self, PlatformError> {
        let (program, rest) = argv.split_first().ok_or(PlatformError::EmptyCommand)?;
        let mut cmd = Self::new(program);
        cmd.args(rest);
        Ok(cmd)
    }

    /// Add an argument to the command
    pub fn arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Set the working directory for the command
    pub fn current_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set an environment variable for the child
    pub fn env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Kill the child if it runs longer than `timeout`
    pub fn timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Get the program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the arguments
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the current directory
    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }

    /// Get the environment overrides
    pub fn get_env_vars(&self) -> &[(String, String)] {
        &self.env_vars
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Display for PlatformCommand {
    /// Space-joined command line as it appears in failure reports
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Output from command execution
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Collapse into exit code plus combined output
    #[must_use]
    pub fn into_result(self) -> CommandResult {
        CommandResult::from_streams(self.exit_code, &self.stdout, &self.stderr)
    }

    /// stdout as lossy UTF-8
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// A long-running child that is killed when dropped
#[async_trait]
pub trait BackgroundProcess: Send {
    /// OS process id, if still known
    fn id(&self) -> Option<u32>;

    /// Exit code if the child has already exited
    fn try_exit_code(&mut self) -> Option<Option<i32>>;

    /// Kill the child and wait for it to be reaped
    async fn kill(&mut self) -> Result<(), Error>;
}

/// Trait for process execution operations
#[async_trait]
pub trait ProcessOperations: Send + Sync {
    /// Execute a command to completion and return its output
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error>;

    /// Start a command in the background without waiting for it
    async fn spawn_background(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<Box<dyn BackgroundProcess>, Error>;

    /// Create a new command builder
    fn create_command(&self, program: &str) -> PlatformCommand {
        PlatformCommand::new(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_argv_and_display() {
        let mut cmd = PlatformCommand::from_argv(&["python3", "-m", "pip"]).unwrap();
        cmd.args(["install", "matlabengine==9.14.*"]);
        assert_eq!(cmd.program(), "python3");
        assert_eq!(cmd.to_string(), "python3 -m pip install matlabengine==9.14.*");
    }

    #[test]
    fn test_empty_argv() {
        let argv: [&str; 0] = [];
        assert!(matches!(
            PlatformCommand::from_argv(&argv),
            Err(PlatformError::EmptyCommand)
        ));
    }
}
