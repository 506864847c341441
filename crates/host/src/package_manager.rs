//! Package manager driven through its command line

use async_trait::async_trait;
use mlprobe_errors::{Error, PackageManagerError};
use mlprobe_platform::{PlatformCommand, PlatformContext, ProcessOperations};
use mlprobe_types::{CommandResult, InstalledPackage, PackageSpec};
use std::sync::Arc;

/// Install, remove and inspect a single package
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Command line used to install `spec`, as shown in failure reports
    fn install_command(&self, spec: &PackageSpec) -> String;

    /// Command line used to remove `name`, as shown in failure reports
    fn uninstall_command(&self, name: &str) -> String;

    /// Install `spec`. A non-zero exit is returned as data, not as `Err`.
    async fn install(&self, spec: &PackageSpec) -> Result<CommandResult, Error>;

    /// Remove `name` without prompting
    async fn uninstall(&self, name: &str) -> Result<CommandResult, Error>;

    /// Installed version of `name`, `None` when it is not installed
    async fn installed(&self, name: &str) -> Result<Option<InstalledPackage>, Error>;

    async fn is_installed(&self, name: &str) -> Result<bool, Error> {
        Ok(self.installed(name).await?.is_some())
    }
}

/// pip-compatible package manager, `python3 -m pip` by default
pub struct PipPackageManager {
    argv: Vec<String>,
    process: Arc<dyn ProcessOperations>,
    ctx: PlatformContext,
}

impl PipPackageManager {
    /// Build from an argv prefix such as `["python3", "-m", "pip"]`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::EmptyCommand` if `argv` is empty.
    pub fn new(
        argv: Vec<String>,
        process: Arc<dyn ProcessOperations>,
        ctx: PlatformContext,
    ) -> Result<Self, Error> {
        PlatformCommand::from_argv(&argv)?;
        Ok(Self { argv, process, ctx })
    }

    fn command<I, S>(&self, args: I) -> Result<PlatformCommand, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cmd = PlatformCommand::from_argv(&self.argv)?;
        cmd.args(args);
        Ok(cmd)
    }

    fn render<I, S>(&self, args: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = self.argv.join(" ");
        for arg in args {
            line.push(' ');
            line.push_str(arg.as_ref());
        }
        line
    }

    async fn run(&self, cmd: PlatformCommand) -> Result<CommandResult, Error> {
        let output = self.process.execute_command(&self.ctx, cmd).await?;
        Ok(output.into_result())
    }
}

/// Pull the `Version:` field out of `pip show` output
pub(crate) fn parse_show_version(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim().eq_ignore_ascii_case("version") {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

#[async_trait]
impl PackageManager for PipPackageManager {
    fn install_command(&self, spec: &PackageSpec) -> String {
        self.render(["install".to_string(), spec.requirement()])
    }

    fn uninstall_command(&self, name: &str) -> String {
        self.render(["uninstall", "-y", name])
    }

    async fn install(&self, spec: &PackageSpec) -> Result<CommandResult, Error> {
        spec.validate()?;
        let requirement = spec.requirement();
        tracing::info!(%requirement, "installing package");
        let cmd = self.command(["install", requirement.as_str()])?;
        self.run(cmd).await
    }

    async fn uninstall(&self, name: &str) -> Result<CommandResult, Error> {
        PackageSpec::latest(name).validate()?;
        tracing::info!(package = name, "uninstalling package");
        let cmd = self.command(["uninstall", "-y", name])?;
        self.run(cmd).await
    }

    async fn installed(&self, name: &str) -> Result<Option<InstalledPackage>, Error> {
        PackageSpec::latest(name).validate()?;
        let result = self.run(self.command(["show", name])?).await?;

        // pip exits non-zero with a "not found" warning for absent packages
        if !result.success() {
            tracing::debug!(package = name, exit_code = result.exit_code, "package not installed");
            return Ok(None);
        }

        let version = parse_show_version(&result.output).ok_or_else(|| {
            PackageManagerError::UnparseableShowOutput {
                package: name.to_string(),
                output: result.output.clone(),
            }
        })?;

        Ok(Some(InstalledPackage {
            name: name.to_string(),
            version,
        }))
    }
}
