use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::event::Event;
use super::state::{Generation, Phase};

pub const TICK_MS: u64 = 1000;

/// Cosmetic walk after `Retrieving`. Purely decorative, not a status feed.
pub const COSMETIC_PHASES: [Phase; 3] = [Phase::Generating, Phase::Validating, Phase::Verifying];

/// Fixed-period simulator that advances the visible phase while the real
/// request is outstanding.
///
/// The ticker never writes state. It sends `Event::PhaseTick` into the
/// controller loop, which decides whether the tick still applies.
#[derive(Debug, Default)]
pub struct PhaseTicker {
    running: Option<(CancellationToken, JoinHandle<()>)>,
}

impl PhaseTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh schedule for `generation`. Any previous schedule is stopped.
    pub fn start(&mut self, generation: Generation, period: Duration, tx: mpsc::Sender<Event>) {
        self.stop();

        let period = period.max(Duration::from_millis(1));
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            // First tick fires one full period after start
            let mut cadence = interval_at(Instant::now() + period, period);
            cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut cursor = 0;

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = cadence.tick() => {
                        // Exhausted: keep running harmlessly until stopped
                        let Some(&phase) = COSMETIC_PHASES.get(cursor) else { continue };
                        cursor += 1;

                        debug!(generation, %phase, "phase tick");
                        if tx.send(Event::PhaseTick { generation, phase }).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        self.running = Some((token, handle));
    }

    /// Cancels the schedule. Idempotent.
    pub fn stop(&mut self) {
        if let Some((token, handle)) = self.running.take() {
            token.cancel();
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

impl Drop for PhaseTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
