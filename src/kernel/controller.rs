use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::event::Event;
use super::reconcile::reconcile;
use super::state::{Generation, Phase, SessionState, StateDelta};
use super::telemetry::event::{OutcomeKind, StaleEventKind, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use super::ticker::{PhaseTicker, TICK_MS};
use crate::services::backend::{BackendError, QueryBackend, QueryResponse};

const EVENT_CAPACITY: usize = 100;

/// Settled generations kept for readers after a new submission replaces them.
pub const HISTORY_LIMIT: usize = 32;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub tick_period: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(TICK_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Accepted { generation: Generation },
    Rejected(RejectReason),
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    EmptyQuery,
    InFlight,
}

#[derive(Debug, Error)]
#[error("session controller has shut down")]
pub struct SessionClosed;

/// Owns the session record and serializes every mutation to it.
///
/// **LOOP LAW**: `step` never awaits. Ticker and request run as separate tasks
/// and only report back through the event channel, so all writes happen here,
/// one event at a time.
pub struct SubmissionController {
    receiver: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    state: SessionState,
    publisher: watch::Sender<SessionState>,
    ticker: PhaseTicker,
    backend: Arc<dyn QueryBackend>,
    config: ControllerConfig,
    history: VecDeque<SessionState>,
    telemetry: TelemetryRecorder,
    session_id: Uuid,
    submitted_at: Option<Instant>,
}

impl SubmissionController {
    pub fn new(backend: Arc<dyn QueryBackend>, config: ControllerConfig) -> Self {
        let (tx, receiver) = mpsc::channel(EVENT_CAPACITY);
        let state = SessionState::new();
        let (publisher, _) = watch::channel(state.clone());

        Self {
            receiver,
            tx,
            state,
            publisher,
            ticker: PhaseTicker::new(),
            backend,
            config,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            telemetry: TelemetryRecorder::new(),
            session_id: Uuid::new_v4(),
            submitted_at: None,
        }
    }

    /// Read-only view for the presentation side, plus the submit intent.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            tx: self.tx.clone(),
            view: self.publisher.subscribe(),
        }
    }

    /// Resets the record, starts the ticker and issues the request.
    ///
    /// The reset is applied and published before this returns, ahead of any
    /// asynchronous work. Rejected calls leave the state untouched.
    pub fn submit(&mut self, query: &str) -> Submission {
        let query = query.trim();
        if query.is_empty() {
            return self.reject(RejectReason::EmptyQuery);
        }
        if self.state.phase().is_in_flight() {
            return self.reject(RejectReason::InFlight);
        }

        self.apply(StateDelta::Reset { query: query.to_string() });
        let generation = self.state.generation();
        self.submitted_at = Some(Instant::now());
        self.telemetry.record(TelemetryEvent::SubmissionAccepted { generation });
        info!(session = %self.session_id, generation, "query accepted");

        self.ticker.start(generation, self.config.tick_period, self.tx.clone());

        // Exactly one request per generation. No retry, no cancellation.
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            let outcome = backend.query(&query).await;
            let _ = tx.send(Event::Settled { generation, outcome }).await;
        });

        Submission::Accepted { generation }
    }

    /// Processes one event. Synchronous by construction.
    pub fn step(&mut self, event: Event) {
        match event {
            Event::Submit { query, reply } => {
                let decision = self.submit(&query);
                if let Some(reply) = reply {
                    let _ = reply.send(decision);
                }
            }
            Event::PhaseTick { generation, phase } => self.advance(generation, phase),
            Event::Settled { generation, outcome } => self.settle(generation, outcome),
        }
    }

    /// Waits for the next event and processes it. Returns `false` once the
    /// channel is closed.
    pub async fn next_event(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(event) => {
                self.step(event);
                true
            }
            None => false,
        }
    }

    /// Async driver loop.
    pub async fn run(mut self) {
        info!(session = %self.session_id, "session controller started");
        while self.next_event().await {}
    }

    fn reject(&mut self, reason: RejectReason) -> Submission {
        debug!(session = %self.session_id, ?reason, "submission rejected");
        self.telemetry.record(TelemetryEvent::SubmissionRejected { reason });
        Submission::Rejected(reason)
    }

    fn advance(&mut self, generation: Generation, phase: Phase) {
        if !self.state.accepts_phase(generation, phase) {
            self.drop_stale(generation, StaleEventKind::PhaseTick);
            return;
        }

        let from = self.state.phase();
        self.apply(StateDelta::PhaseAdvanced(phase));
        self.telemetry.record(TelemetryEvent::PhaseTransition { generation, from, to: phase });
    }

    fn settle(&mut self, generation: Generation, outcome: Result<QueryResponse, BackendError>) {
        if generation != self.state.generation() || !self.state.phase().is_in_flight() {
            self.drop_stale(generation, StaleEventKind::Settlement);
            return;
        }

        // Ticker dies before any terminal field is written
        self.ticker.stop();

        let latency_ms = self
            .submitted_at
            .take()
            .map(|at| millis(at.elapsed()))
            .unwrap_or(0);

        let kind = match outcome {
            Ok(payload) => {
                self.apply(StateDelta::Resolved(reconcile(payload)));
                info!(
                    session = %self.session_id,
                    generation,
                    latency_ms,
                    trust_score = self.state.trust_score(),
                    claims = self.state.claims().len(),
                    "query resolved"
                );
                OutcomeKind::Resolved
            }
            Err(err) => {
                warn!(session = %self.session_id, generation, latency_ms, error = %err, "query failed");
                self.apply(StateDelta::Failed { cause: err.to_string() });
                OutcomeKind::Failed
            }
        };

        self.telemetry.record(TelemetryEvent::Settled { generation, outcome: kind, latency_ms });
        self.archive();
    }

    fn drop_stale(&mut self, generation: Generation, kind: StaleEventKind) {
        debug!(
            session = %self.session_id,
            generation,
            current = self.state.generation(),
            phase = %self.state.phase(),
            ?kind,
            "discarded stale event"
        );
        self.telemetry.record(TelemetryEvent::StaleEventDropped { generation, kind });
    }

    fn apply(&mut self, delta: StateDelta) {
        self.state.reduce(delta);
        self.publisher.send_replace(self.state.clone());
    }

    fn archive(&mut self) {
        if self.history.len() >= HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(self.state.clone());
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Terminal snapshots of earlier generations, oldest first.
    pub fn history(&self) -> &VecDeque<SessionState> {
        &self.history
    }

    pub fn telemetry(&self) -> &TelemetryRecorder {
        &self.telemetry
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// Presentation-facing side of a session. Can read snapshots and raise the
/// submit intent; has no write access to the record.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Event>,
    view: watch::Receiver<SessionState>,
}

impl SessionHandle {
    pub async fn submit(&self, query: impl Into<String>) -> Result<Submission, SessionClosed> {
        let (reply, decision) = oneshot::channel();
        self.tx
            .send(Event::Submit { query: query.into(), reply: Some(reply) })
            .await
            .map_err(|_| SessionClosed)?;
        decision.await.map_err(|_| SessionClosed)
    }

    pub fn snapshot(&self) -> SessionState {
        self.view.borrow().clone()
    }

    /// Waits for the next published mutation.
    pub async fn changed(&mut self) -> Result<SessionState, SessionClosed> {
        self.view.changed().await.map_err(|_| SessionClosed)?;
        Ok(self.view.borrow_and_update().clone())
    }

    /// Waits until no request is outstanding.
    pub async fn settled(&mut self) -> Result<SessionState, SessionClosed> {
        let state = self
            .view
            .wait_for(|state| !state.phase().is_in_flight())
            .await
            .map_err(|_| SessionClosed)?;
        Ok(state.clone())
    }
}

// Saturates instead of truncating the u128
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
