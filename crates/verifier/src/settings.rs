//! Knobs the verifier reads from configuration

use mlprobe_config::Config;
use mlprobe_types::{CleanupPolicy, MatchMode, Release};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct VerifierSettings {
    /// Package under test
    pub package: String,
    /// Release the no-version scenario is pinned to
    pub expected_release: Release,
    /// Name used when the host session is not shared yet
    pub session_name: String,
    pub match_mode: MatchMode,
    pub cleanup_policy: CleanupPolicy,
    pub discovery_timeout: Duration,
    pub poll_interval: Duration,
}

impl VerifierSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            package: config.package.name.clone(),
            expected_release: config.host.expected_release,
            session_name: config.verify.session_name.clone(),
            match_mode: config.verify.match_mode,
            cleanup_policy: config.verify.cleanup_policy,
            discovery_timeout: config.discovery_timeout(),
            poll_interval: config.poll_interval(),
        }
    }
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
