pub mod controller;
pub mod event;
pub mod reconcile;
pub mod state;
pub mod telemetry;
pub mod ticker;
