//! The host runtime whose engine the interop package talks to

use async_trait::async_trait;
use mlprobe_errors::{Error, HostError};
use mlprobe_platform::{BackgroundProcess, PlatformCommand, PlatformContext, ProcessOperations};
use mlprobe_types::HostVersion;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::session::SessionRegistry;

/// Version query and session sharing on the host runtime
#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Version and release of the host, e.g. `9.14.0.2206163 (R2023a)`
    async fn version(&self) -> Result<HostVersion, Error>;

    /// Name the session is currently shared under, empty when unshared
    async fn engine_name(&self) -> Result<String, Error>;

    /// Share the session under `name`. Sharing the current name again is a
    /// no-op; renaming a shared session fails.
    async fn share_engine(&self, name: &str) -> Result<(), Error>;
}

/// MATLAB driven in batch mode
pub struct MatlabHost {
    program: PathBuf,
    process: Arc<dyn ProcessOperations>,
    ctx: PlatformContext,
    registry: Arc<SessionRegistry>,
    startup_grace: Duration,
}

/// How long a freshly spawned session child must stay up before it is
/// trusted to be serving the session
const DEFAULT_STARTUP_GRACE: Duration = Duration::from_secs(2);

impl MatlabHost {
    /// Host using the process-wide session registry
    pub fn new(
        program: impl Into<PathBuf>,
        process: Arc<dyn ProcessOperations>,
        ctx: PlatformContext,
    ) -> Self {
        Self::with_registry(program, process, ctx, SessionRegistry::global())
    }

    pub fn with_registry(
        program: impl Into<PathBuf>,
        process: Arc<dyn ProcessOperations>,
        ctx: PlatformContext,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            program: program.into(),
            process,
            ctx,
            registry,
            startup_grace: DEFAULT_STARTUP_GRACE,
        }
    }

    #[must_use]
    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }

    fn batch(&self, statement: &str) -> PlatformCommand {
        let mut cmd = PlatformCommand::new(self.program.to_string_lossy());
        cmd.args(["-batch", statement]);
        cmd
    }

    async fn start_shared_session(
        &self,
        name: String,
    ) -> Result<Box<dyn BackgroundProcess>, Error> {
        // The batch process shares the engine then idles so the session
        // stays discoverable until the registry is shut down.
        let statement = format!(
            "matlab.engine.shareEngine({}); while true, pause(60); end",
            matlab_quote(&name)
        );
        let cmd = self.batch(&statement);
        let mut child = self
            .process
            .spawn_background(&self.ctx, cmd)
            .await
            .map_err(|e| HostError::PublishFailed {
                name: name.clone(),
                message: e.to_string(),
            })?;

        tokio::time::sleep(self.startup_grace).await;
        if let Some(code) = child.try_exit_code() {
            let status = code.map_or_else(|| "a signal".to_string(), |c| c.to_string());
            return Err(HostError::PublishFailed {
                name,
                message: format!("session process exited during startup with {status}"),
            }
            .into());
        }
        Ok(child)
    }
}

/// Single-quoted MATLAB char literal
pub(crate) fn matlab_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait]
impl HostRuntime for MatlabHost {
    async fn version(&self) -> Result<HostVersion, Error> {
        let cmd = self.batch("disp(version)");
        let result = self
            .process
            .execute_command(&self.ctx, cmd)
            .await?
            .into_result();

        if !result.success() {
            return Err(HostError::VersionQueryFailed {
                exit_code: result.exit_code,
                output: result.output,
            }
            .into());
        }

        let version = HostVersion::parse(&result.output).map_err(|_| {
            HostError::UnexpectedVersionOutput {
                output: result.output.clone(),
            }
        })?;
        tracing::debug!(%version, "queried host version");
        Ok(version)
    }

    async fn engine_name(&self) -> Result<String, Error> {
        Ok(self.registry.current_name().await)
    }

    async fn share_engine(&self, name: &str) -> Result<(), Error> {
        self.registry
            .publish(name, |name| async move {
                self.start_shared_session(name).await.map(Some)
            })
            .await?;
        Ok(())
    }
}
