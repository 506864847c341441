//! Discovery through the installed interop package

use async_trait::async_trait;
use mlprobe_errors::{Error, HostError};
use mlprobe_platform::{PlatformCommand, PlatformContext, ProcessOperations};
use std::path::PathBuf;
use std::sync::Arc;

/// Script run by the bridge interpreter, one session name per line
const FIND_SESSIONS_SCRIPT: &str =
    "import matlab.engine\nfor name in matlab.engine.find_matlab():\n    print(name)\n";

/// The reverse direction: an external process looking for shared sessions
#[async_trait]
pub trait EngineBridge: Send + Sync {
    /// Names of the shared sessions visible right now
    async fn find_sessions(&self) -> Result<Vec<String>, Error>;
}

/// Python interpreter with the interop package importable
pub struct PythonBridge {
    interpreter: PathBuf,
    process: Arc<dyn ProcessOperations>,
    ctx: PlatformContext,
}

impl PythonBridge {
    pub fn new(
        interpreter: impl Into<PathBuf>,
        process: Arc<dyn ProcessOperations>,
        ctx: PlatformContext,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            process,
            ctx,
        }
    }
}

pub(crate) fn parse_session_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl EngineBridge for PythonBridge {
    async fn find_sessions(&self) -> Result<Vec<String>, Error> {
        let mut cmd = PlatformCommand::new(self.interpreter.to_string_lossy());
        cmd.args(["-c", FIND_SESSIONS_SCRIPT]);

        let output = self.process.execute_command(&self.ctx, cmd).await?;
        if output.exit_code != Some(0) {
            let result = output.into_result();
            return Err(HostError::DiscoveryFailed {
                exit_code: result.exit_code,
                output: result.output,
            }
            .into());
        }

        // stderr may carry import warnings, only stdout lists sessions
        let names = parse_session_names(&output.stdout_lossy());
        tracing::debug!(?names, "discovered shared sessions");
        Ok(names)
    }
}
