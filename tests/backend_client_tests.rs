mod common;

use std::sync::{Arc, Mutex};

use axiomai::kernel::controller::{ControllerConfig, SubmissionController};
use axiomai::kernel::state::{ClaimStatus, Phase, FAILURE_MESSAGE, RESOLUTION_COMPLETE};
use axiomai::services::backend::{BackendClient, BackendError, QueryBackend, QueryRequest};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use common::{drive_until_settled, scenario_a_json};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone)]
struct BackendState {
    status: StatusCode,
    body: String,
    // (content-type, raw body) per request
    seen: Arc<Mutex<Vec<(Option<String>, String)>>>,
}

async fn handle_query(
    State(state): State<BackendState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.seen.lock().unwrap().push((content_type, body));
    (state.status, [(header::CONTENT_TYPE, "application/json")], state.body.clone())
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "AXIOMAI" }))
}

async fn spawn_backend(status: StatusCode, body: impl Into<String>) -> (String, BackendState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = BackendState {
        status,
        body: body.into(),
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/api/v1/query", post(handle_query))
        .route("/api/v1/health", get(handle_health))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

#[tokio::test]
async fn test_query_posts_json_body() {
    let (url, state) = spawn_backend(StatusCode::OK, scenario_a_json().to_string()).await;
    let client = BackendClient::new(url);

    let response = client.query("What is X?").await.expect("query");
    assert_eq!(response.trust_score, Some(0.82));
    assert_eq!(response.answer.as_deref(), Some("X is Y."));

    let seen = state.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.as_deref(), Some("application/json"));
    let request: QueryRequest = serde_json::from_str(&seen[0].1).expect("request body");
    assert_eq!(request, QueryRequest { query: "What is X?".to_string() });
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let (url, _state) = spawn_backend(StatusCode::INTERNAL_SERVER_ERROR, "{\"detail\":\"boom\"}").await;
    let client = BackendClient::new(url);

    match client.query("What is X?").await {
        Err(BackendError::Status(status)) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unparseable_body_is_a_decode_error() {
    let (url, _state) = spawn_backend(StatusCode::OK, "<html>not json</html>").await;
    let client = BackendClient::new(url);

    assert!(matches!(client.query("What is X?").await, Err(BackendError::Decode(_))));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = BackendClient::new(format!("http://{addr}"));
    assert!(matches!(client.query("What is X?").await, Err(BackendError::Transport(_))));
}

#[tokio::test]
async fn test_health_reports_service() {
    let (url, _state) = spawn_backend(StatusCode::OK, "{}").await;
    let client = BackendClient::new(format!("{url}/"));
    assert_eq!(client.base_url(), url);

    let health = client.health().await.expect("health");
    assert_eq!(health.status, "ok");
    assert_eq!(health.service, "AXIOMAI");
}

#[tokio::test]
async fn test_end_to_end_success_over_http() {
    let (url, _state) = spawn_backend(StatusCode::OK, scenario_a_json().to_string()).await;
    let mut controller = SubmissionController::new(Arc::new(BackendClient::new(url)), ControllerConfig::default());

    assert!(controller.submit("What is X?").is_accepted());
    drive_until_settled(&mut controller).await;

    let state = controller.state();
    assert_eq!(state.phase(), Phase::Done);
    assert_eq!(state.trust_score(), 0.82);
    assert_eq!(state.claims()[0].status, ClaimStatus::Supported);
    let log = state.reasoning_log();
    assert_eq!(log[log.len() - 2], "[RETRIEVER] found 3 docs");
    assert_eq!(log[log.len() - 1], RESOLUTION_COMPLETE);
}

#[tokio::test]
async fn test_end_to_end_http_500() {
    let (url, _state) = spawn_backend(StatusCode::INTERNAL_SERVER_ERROR, "{}").await;
    let mut controller = SubmissionController::new(Arc::new(BackendClient::new(url)), ControllerConfig::default());

    controller.submit("What is X?");
    drive_until_settled(&mut controller).await;

    let state = controller.state();
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.error(), Some(FAILURE_MESSAGE));
    assert_eq!(state.trust_score(), 0.0);
    assert!(state.reasoning_log().iter().any(|line| line.starts_with("[ERROR]")));
    assert!(!controller.ticker_running());
}

#[tokio::test]
async fn test_end_to_end_mistyped_fields_resolve_with_defaults() {
    let body = json!({
        "answer": 5,
        "trust_score": "0.82",
        "claims": { "text": "a" },
        "citations": "doc1"
    });
    let (url, _state) = spawn_backend(StatusCode::OK, body.to_string()).await;
    let mut controller = SubmissionController::new(Arc::new(BackendClient::new(url)), ControllerConfig::default());

    controller.submit("What is X?");
    drive_until_settled(&mut controller).await;

    let state = controller.state();
    assert_eq!(state.phase(), Phase::Done);
    assert_eq!(state.error(), None);
    assert_eq!(state.answer(), "5");
    assert_eq!(state.trust_score(), 0.0);
    assert!(state.claims().is_empty());
    assert!(state.citations().is_empty());
    assert_eq!(state.reasoning_log().last().map(String::as_str), Some(RESOLUTION_COMPLETE));
}

#[tokio::test]
async fn test_end_to_end_unparseable_body_fails_session() {
    let (url, _state) = spawn_backend(StatusCode::OK, "<html>not json</html>").await;
    let mut controller = SubmissionController::new(Arc::new(BackendClient::new(url)), ControllerConfig::default());

    controller.submit("What is X?");
    drive_until_settled(&mut controller).await;

    assert_eq!(controller.state().phase(), Phase::Idle);
    assert_eq!(controller.state().error(), Some(FAILURE_MESSAGE));
    assert!(!controller.ticker_running());
}
