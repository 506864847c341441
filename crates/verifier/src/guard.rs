//! RAII guard that uninstalls the package on every exit path

use mlprobe_errors::Error;
use mlprobe_host::PackageManager;
use mlprobe_types::CommandResult;
use std::sync::Arc;

/// Armed before install, finished during cleanup.
///
/// If the guard is dropped while still armed (the scenario future was
/// cancelled or panicked) a best-effort uninstall is spawned on the current
/// tokio runtime.
pub struct CleanupGuard {
    package_manager: Option<Arc<dyn PackageManager>>,
    package: String,
}

impl CleanupGuard {
    #[must_use]
    pub fn arm(package_manager: Arc<dyn PackageManager>, package: impl Into<String>) -> Self {
        Self {
            package_manager: Some(package_manager),
            package: package.into(),
        }
    }

    /// Run the uninstall now and disarm
    ///
    /// # Errors
    ///
    /// Returns an error if the uninstall command could not be run at all.
    /// A non-zero exit is returned in the `CommandResult`.
    pub async fn finish(mut self) -> Result<CommandResult, Error> {
        let Some(package_manager) = self.package_manager.take() else {
            return Err(Error::internal("cleanup guard already finished"));
        };
        package_manager.uninstall(&self.package).await
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let Some(package_manager) = self.package_manager.take() else {
            return;
        };
        let package = std::mem::take(&mut self.package);
        tracing::warn!(package = %package, "scenario interrupted, uninstalling in background");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    // Best effort, nobody is left to report to
                    if let Err(e) = package_manager.uninstall(&package).await {
                        tracing::error!(
                            package = %package,
                            error = %e,
                            "background uninstall failed"
                        );
                    }
                });
            }
            Err(_) => {
                tracing::error!(
                    package = %package,
                    "no runtime to uninstall on, package left installed"
                );
            }
        }
    }
}
