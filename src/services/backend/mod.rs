//! Outbound HTTP to the grounding pipeline backend.
//!
//! The backend owns retrieval, generation, claim verification and trust
//! scoring. This side only issues `POST /api/v1/query` and reads the payload.

pub mod client;
pub mod error;
pub mod types;

pub use client::{BackendClient, QueryBackend};
pub use error::BackendError;
pub use types::{HealthResponse, QueryRequest, QueryResponse};
