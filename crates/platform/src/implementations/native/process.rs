//! Process operations on top of `tokio::process`
//!
//! Wraps command execution with event emission, timeout handling and
//! error mapping into `PlatformError`.

use async_trait::async_trait;
use mlprobe_errors::{Error, PlatformError};
use mlprobe_events::{AppEvent, FailureContext, ProcessEvent};
use std::convert::TryFrom;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};

use crate::core::PlatformContext;
use crate::process::{BackgroundProcess, CommandOutput, PlatformCommand, ProcessOperations};

/// Process operations backed by `tokio::process::Command`
pub struct NativeProcessOperations;

impl NativeProcessOperations {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NativeProcessOperations {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn spawn_error(program: &str, err: &std::io::Error) -> PlatformError {
    if err.kind() == std::io::ErrorKind::NotFound {
        PlatformError::CommandNotFound {
            command: program.to_string(),
        }
    } else {
        PlatformError::ProcessExecutionFailed {
            command: program.to_string(),
            message: err.to_string(),
        }
    }
}

fn build_command(cmd: &PlatformCommand) -> Command {
    let mut command = Command::new(cmd.program());
    command.args(cmd.get_args());

    if let Some(dir) = cmd.get_current_dir() {
        command.current_dir(dir);
    }

    for (key, value) in cmd.get_env_vars() {
        command.env(key, value);
    }

    command.stdin(Stdio::null());
    command.kill_on_drop(true);
    command
}

fn emit_process_started(ctx: &PlatformContext, cmd: &PlatformCommand) {
    ctx.emit_event(AppEvent::Process(ProcessEvent::Started {
        program: cmd.program().to_string(),
        args: cmd.get_args().to_vec(),
        cwd: cmd.get_current_dir().cloned(),
    }));
}

fn emit_process_completed(
    ctx: &PlatformContext,
    program: &str,
    output: &CommandOutput,
    duration: Duration,
) {
    let output_bytes = output.stdout.len() + output.stderr.len();
    ctx.emit_event(AppEvent::Process(ProcessEvent::Completed {
        program: program.to_string(),
        exit_code: output
            .exit_code
            .unwrap_or(mlprobe_types::command::SIGNALLED_EXIT_CODE),
        duration_ms: duration_to_millis(duration),
        output_bytes: u64::try_from(output_bytes).unwrap_or(u64::MAX),
    }));
}

fn emit_process_failed(
    ctx: &PlatformContext,
    program: &str,
    error: &PlatformError,
    duration: Duration,
) {
    ctx.emit_event(AppEvent::Process(ProcessEvent::Failed {
        program: program.to_string(),
        failure: FailureContext::from_error(error),
        duration_ms: duration_to_millis(duration),
    }));
}

/// Background child killed on drop
struct TokioBackgroundProcess {
    program: String,
    child: Child,
}

#[async_trait]
impl BackgroundProcess for TokioBackgroundProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_exit_code(&mut self) -> Option<Option<i32>> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(status.code()),
            Ok(None) | Err(_) => None,
        }
    }

    async fn kill(&mut self) -> Result<(), Error> {
        if matches!(self.child.try_wait(), Ok(Some(_))) {
            return Ok(());
        }
        tracing::debug!(
            program = %self.program,
            pid = ?self.child.id(),
            "killing background command"
        );
        self.child.kill().await.map_err(|e| {
            PlatformError::ProcessExecutionFailed {
                command: self.program.clone(),
                message: format!("failed to kill: {e}"),
            }
            .into()
        })
    }
}

#[async_trait]
impl ProcessOperations for NativeProcessOperations {
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        let start = Instant::now();
        let timeout = cmd.get_timeout().or(ctx.default_timeout());
        tracing::debug!(command = %cmd, ?timeout, "executing command");

        emit_process_started(ctx, &cmd);

        let result: Result<CommandOutput, PlatformError> = async {
            let mut command = build_command(&cmd);
            let output_future = command.output();

            let output = match timeout {
                Some(limit) => tokio::time::timeout(limit, output_future)
                    .await
                    .map_err(|_| PlatformError::Timeout {
                        command: cmd.to_string(),
                        timeout_seconds: limit.as_secs(),
                    })?,
                None => output_future.await,
            }
            .map_err(|e| spawn_error(cmd.program(), &e))?;

            Ok(CommandOutput {
                exit_code: output.status.code(),
                stdout: output.stdout,
                stderr: output.stderr,
            })
        }
        .await;

        let duration = start.elapsed();

        match &result {
            Ok(output) => emit_process_completed(ctx, cmd.program(), output, duration),
            Err(e) => emit_process_failed(ctx, cmd.program(), e, duration),
        }

        result.map_err(Error::from)
    }

    async fn spawn_background(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<Box<dyn BackgroundProcess>, Error> {
        tracing::debug!(command = %cmd, "spawning background command");
        emit_process_started(ctx, &cmd);

        let mut command = build_command(&cmd);
        command.stdout(Stdio::null()).stderr(Stdio::null());

        match command.spawn() {
            Ok(child) => Ok(Box::new(TokioBackgroundProcess {
                program: cmd.program().to_string(),
                child,
            })),
            Err(e) => {
                let err = spawn_error(cmd.program(), &e);
                emit_process_failed(ctx, cmd.program(), &err, Duration::ZERO);
                Err(err.into())
            }
        }
    }
}
