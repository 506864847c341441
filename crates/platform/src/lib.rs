#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for running external programs.
//!
//! Every command the probe runs (package manager, host runtime, bridge
//! interpreter) goes through [`ProcessOperations`], which captures exit code
//! and combined output, applies an optional timeout and emits process events.

pub mod core;
pub mod implementations;
pub mod process;

pub use core::{Platform, PlatformContext};
pub use implementations::native::NativeProcessOperations;
pub use process::{BackgroundProcess, CommandOutput, PlatformCommand, ProcessOperations};
