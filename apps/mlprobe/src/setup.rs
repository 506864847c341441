//! Wiring configuration into the host seams

use mlprobe_config::Config;
use mlprobe_events::EventSender;
use mlprobe_host::{HostSeams, MatlabHost, PipPackageManager, PythonBridge};
use mlprobe_platform::Platform;
use std::sync::Arc;

use crate::error::CliError;

/// Everything a command needs to talk to the outside world
pub struct SystemSetup {
    config: Config,
    seams: HostSeams,
}

impl SystemSetup {
    /// Build the package manager, host runtime and bridge from `config`
    pub fn new(config: Config, event_sender: EventSender) -> Result<Self, CliError> {
        let platform = Platform::current();
        let ctx = platform
            .create_context(Some(event_sender))
            .with_default_timeout(config.command_timeout());
        let process = platform.shared_process();

        let package_manager = PipPackageManager::new(
            config.package.manager.clone(),
            Arc::clone(&process),
            ctx.clone(),
        )
        .map_err(|e| CliError::Setup(format!("package.manager: {e}")))?;
        let runtime =
            MatlabHost::new(config.host.matlab.clone(), Arc::clone(&process), ctx.clone());
        let bridge = PythonBridge::new(config.bridge.python.clone(), process, ctx);

        tracing::debug!(
            manager = ?config.package.manager,
            matlab = %config.host.matlab.display(),
            python = %config.bridge.python.display(),
            "host seams ready"
        );

        Ok(Self {
            seams: HostSeams::new(Arc::new(package_manager), Arc::new(runtime), Arc::new(bridge)),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn seams(&self) -> &HostSeams {
        &self.seams
    }
}
