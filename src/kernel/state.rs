use serde::{Deserialize, Serialize};
use std::fmt;

use super::reconcile::Resolution;

/// Monotonic submission counter. Every accepted `submit` starts a new generation.
pub type Generation = u64;

pub const BOOT_LOG: [&str; 2] = ["[SYSTEM] AXIOMAI initialized.", "[WAIT] Awaiting user query..."];
pub const FAILURE_MESSAGE: &str = "Failed to connect to AXIOMAI Intelligence Backend.";
pub const RESOLUTION_COMPLETE: &str = "[SYSTEM] Query resolution complete.";

/// Visualized pipeline stage. Declaration order is the pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Retrieving,
    Generating,
    Validating,
    Verifying,
    Refreshing,
    Done,
}

impl Phase {
    /// A request is outstanding in every phase except `Idle` and `Done`.
    pub fn is_in_flight(self) -> bool {
        !matches!(self, Phase::Idle | Phase::Done)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Retrieving => "retrieving",
            Phase::Generating => "generating",
            Phase::Validating => "validating",
            Phase::Verifying => "verifying",
            Phase::Refreshing => "refreshing",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Supported,
    LowConfidence,
    Hallucinated,
    Unknown,
}

impl ClaimStatus {
    /// Anything the backend sends that we don't recognise maps to `Unknown`.
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "supported" => ClaimStatus::Supported,
            "low_confidence" => ClaimStatus::LowConfidence,
            "hallucinated" => ClaimStatus::Hallucinated,
            _ => ClaimStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub text: String,
    pub status: ClaimStatus,
    pub evidence_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub similarity: f64,
    pub freshness_days: Option<u64>,
    pub snippet: Option<String>,
}

/// Strict state delta. This is the ONLY way state mutates.
#[derive(Debug, Clone)]
pub enum StateDelta {
    /// Full replacement of the record for a newly accepted query.
    Reset { query: String },
    PhaseAdvanced(Phase),
    Resolved(Resolution),
    Failed { cause: String },
}

/// The canonical record for one query lifecycle.
///
/// Fields are private: the controller mutates through `reduce`, everyone else
/// sees clones published after each mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    phase: Phase,
    trust_score: f64,
    claims: Vec<Claim>,
    citations: Vec<Citation>,
    answer: String,
    reasoning_log: Vec<String>,
    error: Option<String>,
    generation: Generation,
    // Monotonic version, bumped on every reduction
    version: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            trust_score: 0.0,
            claims: Vec::new(),
            citations: Vec::new(),
            answer: String::new(),
            reasoning_log: BOOT_LOG.iter().map(|line| line.to_string()).collect(),
            error: None,
            generation: 0,
            version: 0,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure reduction: State + Delta -> Mutated State
    pub fn reduce(&mut self, delta: StateDelta) {
        self.version += 1;

        match delta {
            StateDelta::Reset { query } => {
                self.generation += 1;
                self.phase = Phase::Retrieving;
                self.trust_score = 0.0;
                self.claims = Vec::new();
                self.citations = Vec::new();
                self.answer = String::new();
                self.reasoning_log = vec![format!("[SYSTEM] New query received: \"{}\"", query)];
                self.error = None;
            }
            StateDelta::PhaseAdvanced(phase) => {
                self.phase = phase;
                self.reasoning_log.push(format!("[SYSTEM] Transitioning to {}...", phase));
            }
            StateDelta::Resolved(resolution) => {
                self.phase = Phase::Done;
                self.trust_score = resolution.trust_score;
                self.answer = resolution.answer;
                self.claims = resolution.claims;
                self.citations = resolution.citations;
                self.reasoning_log.extend(resolution.log);
                self.reasoning_log.push(RESOLUTION_COMPLETE.to_string());
            }
            StateDelta::Failed { cause } => {
                self.phase = Phase::Idle;
                self.error = Some(FAILURE_MESSAGE.to_string());
                self.reasoning_log.push(format!("[ERROR] {}", cause));
            }
        }
    }

    /// A cosmetic advance is only valid for the live generation, while a request
    /// is outstanding, and never backwards.
    pub fn accepts_phase(&self, generation: Generation, phase: Phase) -> bool {
        generation == self.generation && self.phase.is_in_flight() && phase > self.phase && phase.is_in_flight()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn trust_score(&self) -> f64 {
        self.trust_score
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn reasoning_log(&self) -> &[String] {
        &self.reasoning_log
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}
