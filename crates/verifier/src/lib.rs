#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Install, verify and clean up the interop package
//!
//! [`InstallVerifier`] drives one scenario at a time through
//! `Start -> Installing -> Installed -> Verifying -> Verified -> CleaningUp -> Done`,
//! recording every failure in the [`ScenarioReport`](mlprobe_types::ScenarioReport)
//! instead of returning early. Under the guaranteed cleanup policy the
//! uninstall is armed in a [`CleanupGuard`] before anything is installed.

mod guard;
mod run;
mod runner;
mod settings;
mod verifier;

pub use guard::CleanupGuard;
pub use runner::run_scenarios;
pub use settings::VerifierSettings;
pub use verifier::InstallVerifier;
