//! Local HTTP control API.
//! Session lifecycle and the action-keyed message contract over the clicker
//! engine. Binds to loopback only.

use crate::browser::page::CdpPage;
use crate::browser::session::SessionInfo;
use crate::clicker::pacing::PacingPolicy;
use crate::state::AppState;
use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type ApiState = Arc<AppState>;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: ApiState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:id", delete(close_session))
        .route("/api/sessions/:id/navigate", post(navigate_session))
        // Message contract
        .route("/api/sessions/:id/message", post(session_message))
        // Utility
        .route("/api/health", get(health))
        .with_state(state)
}

pub fn app(state: ApiState) -> Router {
    use tower::limit::ConcurrencyLimitLayer;
    router(state)
        .layer(ConcurrencyLimitLayer::new(32))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::DELETE,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
}

pub async fn run_server(state: ApiState, port: u16) -> Result<(), String> {
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .map_err(|e| format!("Failed to bind API port {}: {}", port, e))?;
    tracing::info!("API server listening on 127.0.0.1:{}", port);
    axum::serve(listener, app(state))
        .await
        .map_err(|e| format!("API server error: {}", e))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

async fn health() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    /// Navigate here after the session is up
    url: Option<String>,
    /// Override the configured headless default
    headless: Option<bool>,
    /// Attach to a running Chrome instead of launching one
    cdp_port: Option<u16>,
}

#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    id: String,
    cdp_port: u16,
}

async fn list_sessions(State(state): State<ApiState>) -> Json<Vec<SessionInfo>> {
    Json(state.session_manager.list().await)
}

async fn create_session(
    State(state): State<ApiState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), (StatusCode, String)> {
    let (id, cdp_port) = match req.cdp_port {
        Some(port) => state
            .session_manager
            .attach(port)
            .await
            .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?,
        None => {
            let (chrome_path, headless) = {
                let config = state.config.read();
                (
                    config.chrome_path.clone(),
                    req.headless.unwrap_or(config.headless),
                )
            };
            crate::config::validate_chrome_path(&chrome_path)
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            state
                .session_manager
                .launch(&chrome_path, headless)
                .await
                .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?
        }
    };

    if let Some(url) = &req.url {
        let handle = state
            .session_manager
            .get(&id)
            .await
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        let client = handle.lock().await;
        client
            .navigate(url)
            .await
            .map_err(|e| (StatusCode::BAD_GATEWAY, e))?;
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse { id, cdp_port }),
    ))
}

async fn close_session(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .session_manager
        .close(&id)
        .await
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct NavigateRequest {
    url: String,
}

async fn navigate_session(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let handle = state
        .session_manager
        .get(&id)
        .await
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    let client = handle.lock().await;
    client
        .navigate(&req.url)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e))?;
    Ok(Json(serde_json::json!({ "status": "success" })))
}

// ---------------------------------------------------------------------------
// Message contract
// ---------------------------------------------------------------------------

async fn session_message(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
    Json(request): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let handle = state
        .session_manager
        .get(&id)
        .await
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    let page = CdpPage::new(handle);

    let (catalog, pacing) = {
        let config = state.config.read();
        let pacing: PacingPolicy = (&config.pacing).into();
        (config.selectors.clone(), pacing)
    };

    let response = state
        .engine
        .handle_message(&id, &page, &catalog, &pacing, &request)
        .await;
    Ok(Json(response))
}
