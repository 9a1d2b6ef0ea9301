use std::collections::VecDeque;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};
use crate::kernel::state::Generation;

/// Generations kept before the oldest one is evicted, events and all.
pub const MAX_GENERATIONS: usize = 1_000;

/// Events stored per generation. Rejections and stale drops can repeat
/// without bound while a request is out; the excess is only counted.
pub const MAX_TRACE_EVENTS: usize = 64;

/// Everything recorded from one accepted submission up to the next.
/// Generation 0 holds what happened before the first submission.
#[derive(Debug, Clone)]
pub struct GenerationTrace {
    pub generation: Generation,
    pub events: Vec<TelemetryEvent>,
    pub overflowed: u64,
}

impl GenerationTrace {
    fn new(generation: Generation) -> Self {
        Self {
            generation,
            events: Vec::new(),
            overflowed: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct TelemetryRecorder {
    traces: VecDeque<GenerationTrace>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if let TelemetryEvent::SubmissionAccepted { generation } = event {
            if self.traces.len() >= MAX_GENERATIONS {
                self.traces.pop_front();
            }
            self.traces.push_back(GenerationTrace::new(generation));
        } else if self.traces.is_empty() {
            self.traces.push_back(GenerationTrace::new(0));
        }

        let Some(trace) = self.traces.back_mut() else {
            return;
        };
        if trace.events.len() >= MAX_TRACE_EVENTS {
            trace.overflowed += 1;
        } else {
            trace.events.push(event);
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(self.events())
    }

    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.traces.iter().flat_map(|trace| trace.events.iter())
    }

    pub fn trace(&self, generation: Generation) -> Option<&GenerationTrace> {
        self.traces.iter().find(|trace| trace.generation == generation)
    }

    pub fn traces(&self) -> impl Iterator<Item = &GenerationTrace> {
        self.traces.iter()
    }

    /// Number of stored events across all kept generations.
    pub fn len(&self) -> usize {
        self.traces.iter().map(|trace| trace.events.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(|trace| trace.events.is_empty())
    }

    pub fn clear(&mut self) {
        self.traces.clear();
    }
}
