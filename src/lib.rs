pub mod config;
pub mod kernel;
pub mod outputs;
pub mod services;

// What a front end needs to drive and observe a session
pub use kernel::controller::{SessionHandle, Submission, SubmissionController};
pub use kernel::state::{Phase, SessionState};
pub use services::backend::{BackendClient, QueryBackend};
