use super::event::{OutcomeKind, TelemetryEvent};
use crate::kernel::controller::RejectReason;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub submission_stats: SubmissionStats,
    pub settlement_stats: SettlementStats,
    pub cosmetic_transitions: u64,
    pub stale_events_dropped: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionStats {
    pub accepted: u64,
    pub rejected_empty: u64,
    pub rejected_in_flight: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SettlementStats {
    pub resolved: u64,
    pub failed: u64,
    pub total_latency_ms: u64,
    pub avg_latency_ms: f64,
    pub max_latency_ms: u64,
}

pub fn compute_snapshot<'a>(events: impl IntoIterator<Item = &'a TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::SubmissionAccepted { .. } => snap.submission_stats.accepted += 1,
            TelemetryEvent::SubmissionRejected { reason } => match reason {
                RejectReason::EmptyQuery => snap.submission_stats.rejected_empty += 1,
                RejectReason::InFlight => snap.submission_stats.rejected_in_flight += 1,
            },
            TelemetryEvent::PhaseTransition { .. } => snap.cosmetic_transitions += 1,
            TelemetryEvent::Settled { outcome, latency_ms, .. } => {
                match outcome {
                    OutcomeKind::Resolved => snap.settlement_stats.resolved += 1,
                    OutcomeKind::Failed => snap.settlement_stats.failed += 1,
                }
                snap.settlement_stats.total_latency_ms += latency_ms;
                if *latency_ms > snap.settlement_stats.max_latency_ms {
                    snap.settlement_stats.max_latency_ms = *latency_ms;
                }
            }
            TelemetryEvent::StaleEventDropped { .. } => snap.stale_events_dropped += 1,
        }
    }

    let settled = snap.settlement_stats.resolved + snap.settlement_stats.failed;
    if settled > 0 {
        snap.settlement_stats.avg_latency_ms = snap.settlement_stats.total_latency_ms as f64 / settled as f64;
    }

    snap
}
