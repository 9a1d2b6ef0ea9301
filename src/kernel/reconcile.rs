use serde_json::Value;

use super::state::{Citation, Claim, ClaimStatus};
use crate::services::backend::QueryResponse;

pub const NO_ANSWER_PLACEHOLDER: &str = "No logical answer generated.";

/// Terminal fields produced from a backend payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub trust_score: f64,
    pub answer: String,
    pub claims: Vec<Claim>,
    pub citations: Vec<Citation>,
    /// Backend log lines, appended after the live log.
    pub log: Vec<String>,
}

/// PURE FUNCTION: backend payload -> terminal session fields.
///
/// Only presence checks are applied. A field of the wrong type reads as
/// absent, and anything malformed inside claim or citation entries is carried
/// through for the renderer to deal with.
pub fn reconcile(payload: QueryResponse) -> Resolution {
    let answer = payload
        .answer
        .as_ref()
        .map(text_of)
        .filter(|answer| !answer.is_empty())
        .unwrap_or_else(|| NO_ANSWER_PLACEHOLDER.to_string());

    Resolution {
        trust_score: trust_score(payload.trust_score.as_ref().and_then(Value::as_f64)),
        answer,
        claims: entries(&payload.claims).iter().map(claim_from_value).collect(),
        citations: entries(&payload.citations).iter().map(citation_from_value).collect(),
        log: entries(&payload.reasoning_log).iter().map(text_of).collect(),
    }
}

/// Missing or non-finite scores read as 0; the rest is held to [0, 1].
pub fn trust_score(raw: Option<f64>) -> f64 {
    match raw {
        Some(score) if score.is_finite() => score.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

// Lists that are not arrays hold nothing
fn entries(field: &Option<Value>) -> &[Value] {
    match field {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

fn claim_from_value(value: &Value) -> Claim {
    match value {
        Value::Object(fields) => Claim {
            text: fields.get("text").map(text_of).unwrap_or_default(),
            status: fields
                .get("status")
                .and_then(Value::as_str)
                .map(ClaimStatus::from_wire)
                .unwrap_or(ClaimStatus::Unknown),
            evidence_count: fields.get("evidence_count").and_then(Value::as_u64),
        },
        other => Claim {
            text: text_of(other),
            status: ClaimStatus::Unknown,
            evidence_count: None,
        },
    }
}

fn citation_from_value(value: &Value) -> Citation {
    match value {
        Value::Object(fields) => Citation {
            source: fields.get("source").map(text_of).unwrap_or_default(),
            similarity: fields.get("similarity").and_then(Value::as_f64).unwrap_or(0.0),
            freshness_days: fields.get("freshness_days").and_then(Value::as_u64),
            snippet: fields.get("snippet").and_then(Value::as_str).map(str::to_string),
        },
        other => Citation {
            source: text_of(other),
            similarity: 0.0,
            freshness_days: None,
            snippet: None,
        },
    }
}

// Strings verbatim, null as empty, anything else as its JSON text
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(raw: Value) -> QueryResponse {
        QueryResponse::from_body(raw)
    }

    #[test]
    fn empty_payload_gets_every_default() {
        let resolution = reconcile(payload(json!({})));
        assert_eq!(resolution.trust_score, 0.0);
        assert_eq!(resolution.answer, NO_ANSWER_PLACEHOLDER);
        assert!(resolution.claims.is_empty());
        assert!(resolution.citations.is_empty());
        assert!(resolution.log.is_empty());
    }

    #[test]
    fn empty_answer_is_replaced_by_placeholder() {
        let resolution = reconcile(payload(json!({ "answer": "" })));
        assert_eq!(resolution.answer, NO_ANSWER_PLACEHOLDER);
    }

    #[test]
    fn trust_score_is_clamped() {
        assert_eq!(trust_score(Some(1.7)), 1.0);
        assert_eq!(trust_score(Some(-0.2)), 0.0);
        assert_eq!(trust_score(Some(f64::NAN)), 0.0);
        assert_eq!(trust_score(Some(0.82)), 0.82);
        assert_eq!(trust_score(None), 0.0);
    }

    #[test]
    fn malformed_entries_pass_through() {
        let resolution = reconcile(payload(json!({
            "claims": [
                { "text": 42, "status": "trusted", "evidence_count": -1 },
                "bare claim"
            ],
            "citations": [
                { "source": "doc1", "similarity": "high", "snippet": 7 }
            ],
            "reasoning_log": ["[VERIFIER] ok", 3]
        })));

        assert_eq!(resolution.claims[0].text, "42");
        assert_eq!(resolution.claims[0].status, ClaimStatus::Unknown);
        assert_eq!(resolution.claims[0].evidence_count, None);
        assert_eq!(resolution.claims[1].text, "bare claim");

        assert_eq!(resolution.citations[0].source, "doc1");
        assert_eq!(resolution.citations[0].similarity, 0.0);
        assert_eq!(resolution.citations[0].snippet, None);

        assert_eq!(resolution.log, vec!["[VERIFIER] ok".to_string(), "3".to_string()]);
    }

    #[test]
    fn mistyped_fields_read_as_absent() {
        let resolution = reconcile(payload(json!({
            "trust_score": "0.82",
            "answer": "ok",
            "claims": { "text": "a" },
            "citations": "doc1",
            "reasoning_log": 7
        })));

        assert_eq!(resolution.trust_score, 0.0);
        assert_eq!(resolution.answer, "ok");
        assert!(resolution.claims.is_empty());
        assert!(resolution.citations.is_empty());
        assert!(resolution.log.is_empty());
    }

    #[test]
    fn non_string_answer_is_rendered_as_text() {
        assert_eq!(reconcile(payload(json!({ "answer": 5 }))).answer, "5");
        assert_eq!(reconcile(payload(json!({ "answer": null }))).answer, NO_ANSWER_PLACEHOLDER);
    }

    #[test]
    fn non_object_body_gets_every_default() {
        let resolution = reconcile(QueryResponse::from_body(json!(["not", "an", "object"])));
        assert_eq!(resolution.answer, NO_ANSWER_PLACEHOLDER);
        assert_eq!(resolution.trust_score, 0.0);
        assert!(resolution.claims.is_empty());
    }
}
