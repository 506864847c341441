#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Seams between the probe and the outside world
//!
//! * [`PackageManager`] installs, removes and inspects the interop package.
//! * [`HostRuntime`] reports the host version and shares a named session.
//! * [`EngineBridge`] runs the installed package's discovery call.
//!
//! Each trait has a process-backed implementation built on
//! `mlprobe-platform`; the verifier only ever sees the traits.

pub mod bridge;
pub mod package_manager;
pub mod runtime;
pub mod session;

pub use bridge::{EngineBridge, PythonBridge};
pub use package_manager::{PackageManager, PipPackageManager};
pub use runtime::{HostRuntime, MatlabHost};
pub use session::{SessionHandle, SessionRegistry};

use std::sync::Arc;

/// The three seams bundled for handing to the verifier
#[derive(Clone)]
pub struct HostSeams {
    pub package_manager: Arc<dyn PackageManager>,
    pub runtime: Arc<dyn HostRuntime>,
    pub bridge: Arc<dyn EngineBridge>,
}

impl HostSeams {
    pub fn new(
        package_manager: Arc<dyn PackageManager>,
        runtime: Arc<dyn HostRuntime>,
        bridge: Arc<dyn EngineBridge>,
    ) -> Self {
        Self {
            package_manager,
            runtime,
            bridge,
        }
    }
}
