//! Presentation helpers. Both read snapshots only.

pub mod console;
pub mod view;
