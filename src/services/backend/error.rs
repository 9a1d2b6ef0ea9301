use reqwest::StatusCode;
use thiserror::Error;

/// Every way a query round-trip can fail. The controller does not tell them
/// apart: all of them settle the session as a failure.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Network response was not ok (HTTP {0})")]
    Status(StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}
