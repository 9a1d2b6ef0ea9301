use serde::{Deserialize, Serialize};

use crate::kernel::controller::RejectReason;
use crate::kernel::state::{Generation, Phase};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    SubmissionAccepted {
        generation: Generation,
    },

    SubmissionRejected {
        reason: RejectReason,
    },

    PhaseTransition {
        generation: Generation,
        from: Phase,
        to: Phase,
    },

    Settled {
        generation: Generation,
        outcome: OutcomeKind,
        latency_ms: u64, // Submit -> settlement, wall clock
    },

    StaleEventDropped {
        generation: Generation,
        kind: StaleEventKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Resolved,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaleEventKind {
    PhaseTick,
    Settlement,
}
