use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::error::BackendError;
use super::types::{HealthResponse, QueryRequest, QueryResponse};
use crate::config::Settings;

pub const QUERY_PATH: &str = "/api/v1/query";
pub const HEALTH_PATH: &str = "/api/v1/health";

/// Seam between the controller and the network. One call per submission.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn query(&self, query: &str) -> Result<QueryResponse, BackendError>;
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// No request timeout: the round-trip is allowed to take as long as the
    /// backend needs.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            client: builder.build().unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_timeout(settings.backend_url.clone(), settings.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse, BackendError> {
        let response = self.client.get(self.endpoint(HEALTH_PATH)).send().await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl QueryBackend for BackendClient {
    async fn query(&self, query: &str) -> Result<QueryResponse, BackendError> {
        let request_body = QueryRequest {
            query: query.to_string(),
        };

        // .json() also sets Content-Type: application/json
        let response = self.client.post(self.endpoint(QUERY_PATH))
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        // Read the body first so a bad payload is a Decode error, not Transport.
        // Only unparseable JSON fails here; field types are the reconciler's concern.
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "query response received");
        let body: serde_json::Value = serde_json::from_slice(&body)?;
        Ok(QueryResponse::from_body(body))
    }
}
