//! Session lifecycle telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer.
//! It must **NEVER** be read inside control logic (controller, ticker, reconciler).
//!
//! # PRIVACY INVARIANT
//! Telemetry events must **NEVER** contain user content (query text, answers, log lines).
//! Only generations, phases, outcome kinds and durations are allowed.

pub mod event;
pub mod metrics;
pub mod recorder;
