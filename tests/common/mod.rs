#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axiomai::kernel::controller::SubmissionController;
use axiomai::services::backend::{BackendError, QueryBackend, QueryResponse};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::sync::oneshot;

pub type Reply = oneshot::Sender<Result<QueryResponse, BackendError>>;

/// Backend double whose replies are released by the test.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<oneshot::Receiver<Result<QueryResponse, BackendError>>>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues the reply for the next call and hands back its trigger.
    pub fn expect_call(&self) -> Reply {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(rx);
        tx
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryBackend for ScriptedBackend {
    async fn query(&self, query: &str) -> Result<QueryResponse, BackendError> {
        self.queries.lock().unwrap().push(query.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(rx) => rx
                .await
                .unwrap_or(Err(BackendError::Status(StatusCode::SERVICE_UNAVAILABLE))),
            None => Err(BackendError::Status(StatusCode::SERVICE_UNAVAILABLE)),
        }
    }
}

pub fn scenario_a_json() -> Value {
    json!({
        "trust_score": 0.82,
        "answer": "X is Y.",
        "claims": [{ "text": "X is Y.", "status": "supported", "evidence_count": 3 }],
        "citations": [{ "source": "doc1", "similarity": 0.91 }],
        "reasoning_log": ["[RETRIEVER] found 3 docs"]
    })
}

pub fn scenario_a_payload() -> QueryResponse {
    QueryResponse::from_body(scenario_a_json())
}

pub async fn drive_until_settled(controller: &mut SubmissionController) {
    while controller.state().phase().is_in_flight() {
        assert!(controller.next_event().await, "event channel closed");
    }
}
