//! Built-in defaults for the probe

/// Interop package installed by every scenario
pub const DEFAULT_PACKAGE: &str = "matlabengine";

/// Name a session is shared under when the host has not named it yet
pub const DEFAULT_SESSION_NAME: &str = "MATLAB_tInstall";

/// The single release the unpinned scenario is valid against
pub const DEFAULT_EXPECTED_RELEASE: &str = "R2023a";

pub const DEFAULT_MATLAB: &str = "matlab";
pub const DEFAULT_PYTHON: &str = "python3";

pub const CONFIG_DIR_NAME: &str = "mlprobe";
pub const CONFIG_FILE_NAME: &str = "config.toml";
