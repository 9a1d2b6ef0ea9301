use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Body of a 2xx `/api/v1/query` response.
///
/// Fields stay raw JSON, whatever their type. Any parseable body is a
/// payload; the reconciler applies the defaults and presence checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub trust_score: Option<Value>,
    pub answer: Option<Value>,
    pub claims: Option<Value>,
    pub citations: Option<Value>,
    pub reasoning_log: Option<Value>,
}

impl QueryResponse {
    /// Picks the known keys out of a decoded body. A body that is not an
    /// object carries none of them.
    pub fn from_body(body: Value) -> Self {
        let Value::Object(mut fields) = body else {
            return Self::default();
        };
        let mut take = |key: &str| fields.remove(key).filter(|value| !value.is_null());
        Self {
            trust_score: take("trust_score"),
            answer: take("answer"),
            claims: take("claims"),
            citations: take("citations"),
            reasoning_log: take("reasoning_log"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
