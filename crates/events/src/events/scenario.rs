//! Install-verify-cleanup scenario events

use mlprobe_types::{ScenarioFailure, ScenarioKind, ScenarioOutcome, ScenarioPhase, Uuid};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioEvent {
    Started {
        scenario_id: Uuid,
        kind: ScenarioKind,
    },

    PhaseChanged {
        scenario_id: Uuid,
        from: ScenarioPhase,
        to: ScenarioPhase,
    },

    /// Assumption not met, nothing was installed
    Skipped {
        scenario_id: Uuid,
        kind: ScenarioKind,
        reason: String,
    },

    /// Host session made discoverable under `name`
    SessionPublished { name: String },

    /// Names returned by the discovery call of the installed package
    SessionsDiscovered { names: Vec<String> },

    FailureRecorded {
        scenario_id: Uuid,
        failure: ScenarioFailure,
    },

    Finished {
        scenario_id: Uuid,
        kind: ScenarioKind,
        outcome: ScenarioOutcome,
        duration_ms: u64,
    },
}
