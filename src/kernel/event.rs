use tokio::sync::oneshot;

use super::controller::Submission;
use super::state::{Generation, Phase};
use crate::services::backend::{BackendError, QueryResponse};

/// Everything the controller loop consumes. Producers (presentation, ticker,
/// request task) only ever send these; they never touch the state.
#[derive(Debug)]
pub enum Event {
    /// The single user intent. `reply` carries the accept/reject decision back.
    Submit {
        query: String,
        reply: Option<oneshot::Sender<Submission>>,
    },
    PhaseTick {
        generation: Generation,
        phase: Phase,
    },
    Settled {
        generation: Generation,
        outcome: Result<QueryResponse, BackendError>,
    },
}
