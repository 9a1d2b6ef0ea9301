//! Derived, read-only view model. Every function here is a pure projection of
//! a session snapshot; nothing feeds back into the controller.

use crate::kernel::state::{ClaimStatus, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Retrieve,
    Generate,
    Validate,
    Verify,
    Refresh,
}

pub const STAGES: [Stage; 5] = [Stage::Retrieve, Stage::Generate, Stage::Validate, Stage::Verify, Stage::Refresh];

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Retrieve => "Retrieve",
            Stage::Generate => "Generate",
            Stage::Validate => "Validate",
            Stage::Verify => "Verify",
            Stage::Refresh => "Refresh",
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            Stage::Retrieve => Phase::Retrieving,
            Stage::Generate => Phase::Generating,
            Stage::Validate => Phase::Validating,
            Stage::Verify => Phase::Verifying,
            Stage::Refresh => Phase::Refreshing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Active,
    Completed,
}

fn stage_index(phase: Phase) -> Option<usize> {
    STAGES.iter().position(|stage| stage.phase() == phase)
}

pub fn stage_statuses(phase: Phase) -> [(Stage, StageStatus); 5] {
    STAGES.map(|stage| {
        let status = match phase {
            Phase::Idle => StageStatus::Pending,
            Phase::Done => StageStatus::Completed,
            _ => match stage_index(phase) {
                Some(current) => {
                    let index = stage_index(stage.phase()).unwrap_or(0);
                    if index < current {
                        StageStatus::Completed
                    } else if index == current {
                        StageStatus::Active
                    } else {
                        StageStatus::Pending
                    }
                }
                None => StageStatus::Pending,
            },
        };
        (stage, status)
    })
}

/// Progress bar fill, 0..=100.
pub fn progress_percent(phase: Phase) -> f64 {
    match phase {
        Phase::Idle => 0.0,
        Phase::Done => 100.0,
        _ => stage_index(phase)
            .map(|index| index as f64 / (STAGES.len() - 1) as f64 * 100.0)
            .unwrap_or(0.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustBand {
    Risk,
    Warning,
    Trusted,
}

impl TrustBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.65 {
            TrustBand::Trusted
        } else if score >= 0.45 {
            TrustBand::Warning
        } else {
            TrustBand::Risk
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrustBand::Risk => "risk",
            TrustBand::Warning => "warning",
            TrustBand::Trusted => "trusted",
        }
    }
}

pub fn claim_badge(status: ClaimStatus) -> &'static str {
    match status {
        ClaimStatus::Supported => "VERIFIED",
        ClaimStatus::LowConfidence => "ATTESTATION_LOW",
        ClaimStatus::Hallucinated => "UNSUPPORTED",
        ClaimStatus::Unknown => "UNKNOWN",
    }
}

pub fn match_percent(similarity: f64) -> i64 {
    (similarity * 100.0).round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTone {
    System,
    Wait,
    Error,
    Agent,
    Plain,
}

const AGENT_TAGS: [&str; 4] = ["[RETRIEVER]", "[GENERATOR]", "[VALIDATOR]", "[VERIFIER]"];

pub fn log_tone(line: &str) -> LogTone {
    if line.contains("[SYSTEM]") {
        LogTone::System
    } else if line.contains("[WAIT]") {
        LogTone::Wait
    } else if line.contains("[ERROR]") {
        LogTone::Error
    } else if AGENT_TAGS.iter().any(|tag| line.contains(tag)) {
        LogTone::Agent
    } else {
        LogTone::Plain
    }
}

/// The query box only takes input when nothing is outstanding.
pub fn input_enabled(phase: Phase) -> bool {
    !phase.is_in_flight()
}
