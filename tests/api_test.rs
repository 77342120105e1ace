//! Integration tests for the local HTTP API.
//! Covers the health probe, session listing, and error paths that need no
//! live browser.

use axum::http::StatusCode;
use tower::ServiceExt;
use webpluck_lib::api::{app, ApiState};
use webpluck_lib::config::AppConfig;
use webpluck_lib::state::AppState;

fn make_state() -> ApiState {
    std::sync::Arc::new(AppState::new(AppConfig::default()))
}

fn make_app() -> axum::Router {
    app(make_state())
}

fn json_body(val: &serde_json::Value) -> axum::body::Body {
    axum::body::Body::from(serde_json::to_vec(val).unwrap())
}

#[tokio::test]
async fn test_api_health() {
    let app = make_app();
    let req = axum::http::Request::builder()
        .uri("/api/health")
        .body(axum::body::Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_api_list_sessions_empty() {
    let app = make_app();
    let req = axum::http::Request::builder()
        .uri("/api/sessions")
        .body(axum::body::Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
    assert!(json.is_empty());
}

#[tokio::test]
async fn test_api_message_unknown_session() {
    let app = make_app();
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/sessions/nonexistent-id/message")
        .header("content-type", "application/json")
        .body(json_body(&serde_json::json!({ "action": "ping" })))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_close_unknown_session() {
    let app = make_app();
    let req = axum::http::Request::builder()
        .method("DELETE")
        .uri("/api/sessions/nonexistent-id")
        .body(axum::body::Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_navigate_unknown_session() {
    let app = make_app();
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/sessions/nonexistent-id/navigate")
        .header("content-type", "application/json")
        .body(json_body(
            &serde_json::json!({ "url": "https://example.com" }),
        ))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_create_session_rejects_bad_chrome_path() {
    let mut config = AppConfig::default();
    config.chrome_path = "/nonexistent/chrome-binary".into();
    let state: ApiState = std::sync::Arc::new(AppState::new(config));
    let app = app(state);

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/sessions")
        .header("content-type", "application/json")
        .body(json_body(&serde_json::json!({ "headless": true })))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
