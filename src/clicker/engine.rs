//! Clicker engine: in-flight run registry and the action-keyed message
//! contract.
//!
//! Exactly one run per session is allowed at a time; a second `run` request
//! while one is in flight is rejected, and `stopOperation` cancels the
//! session's current run through its own token.

use crate::browser::page::Page;
use crate::clicker::cancel::CancelToken;
use crate::clicker::pacing::PacingPolicy;
use crate::clicker::selectors::SelectorCatalog;
use crate::clicker::sequencer;
use crate::error::{Result, WebpluckError};
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct ClickerEngine {
    /// Cancel tokens of in-flight runs, keyed by session id.
    runs: Mutex<HashMap<String, CancelToken>>,
}

impl ClickerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new run for a session. Fails when one is already in flight.
    pub async fn begin_run(&self, session_id: &str) -> Result<CancelToken> {
        let mut runs = self.runs.lock().await;
        if runs.contains_key(session_id) {
            return Err(WebpluckError::RunInProgress(session_id.to_string()));
        }
        let token = CancelToken::new();
        runs.insert(session_id.to_string(), token.clone());
        Ok(token)
    }

    /// Remove a session's run entry once its result has been produced.
    pub async fn finish_run(&self, session_id: &str) {
        self.runs.lock().await.remove(session_id);
    }

    /// Cancel a session's in-flight run. Returns false when nothing was
    /// running (still a successful stop from the caller's point of view).
    pub async fn request_stop(&self, session_id: &str) -> bool {
        let runs = self.runs.lock().await;
        match runs.get(session_id) {
            Some(token) => {
                token.request_cancel();
                tracing::info!("Stop requested for session {}", session_id);
                true
            }
            None => {
                tracing::debug!("Stop requested for idle session {}", session_id);
                false
            }
        }
    }

    pub async fn is_running(&self, session_id: &str) -> bool {
        self.runs.lock().await.contains_key(session_id)
    }

    /// Dispatch one `action`-keyed request against a session's page and
    /// produce the response body. Always answers; unknown actions are
    /// acknowledged and ignored.
    pub async fn handle_message(
        &self,
        session_id: &str,
        page: &dyn Page,
        catalog: &SelectorCatalog,
        pacing: &PacingPolicy,
        request: &serde_json::Value,
    ) -> serde_json::Value {
        let action = request
            .get("action")
            .and_then(|a| a.as_str())
            .unwrap_or_default();
        tracing::debug!("Session {} received action {:?}", session_id, action);

        // Readiness probe, answered unconditionally.
        if action == "ping" {
            return json!({ "status": "pong", "ready": true });
        }

        if action == "stopOperation" {
            self.request_stop(session_id).await;
            return json!({ "status": "success", "message": "operation stopped" });
        }

        // Everything else needs a live document.
        match page.dom_ready().await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("Session {}: DOM not ready", session_id);
                return json!({ "status": "error", "message": "DOM not ready" });
            }
            Err(e) => return json!({ "status": "error", "message": e }),
        }

        match action {
            "clickElements" | "autoClickElements" => {
                let token = match self.begin_run(session_id).await {
                    Ok(token) => token,
                    Err(_) => {
                        return json!({
                            "status": "error",
                            "message": "operation already in progress"
                        });
                    }
                };
                let result = sequencer::run(page, catalog, pacing, &token).await;
                self.finish_run(session_id).await;
                tracing::info!(
                    "Session {} run finished: {:?} ({} target clicks, {} triggers)",
                    session_id,
                    result.status,
                    result.target_click_count,
                    result.trigger_processed_count
                );
                serde_json::to_value(&result)
                    .unwrap_or_else(|e| json!({ "status": "error", "message": e.to_string() }))
            }
            "clearHighlight" => json!({ "status": "success" }),
            other => {
                tracing::debug!("Ignoring unknown action {:?}", other);
                json!({ "status": "ignored" })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_begin_run_rejects_second_run() {
        let engine = ClickerEngine::new();
        let _token = engine.begin_run("s1").await.unwrap();
        assert!(engine.is_running("s1").await);
        assert!(matches!(
            engine.begin_run("s1").await,
            Err(WebpluckError::RunInProgress(_))
        ));

        // Other sessions are unaffected.
        assert!(engine.begin_run("s2").await.is_ok());

        engine.finish_run("s1").await;
        assert!(!engine.is_running("s1").await);
        assert!(engine.begin_run("s1").await.is_ok());
    }

    #[tokio::test]
    async fn test_request_stop_cancels_active_token() {
        let engine = ClickerEngine::new();
        let token = engine.begin_run("s1").await.unwrap();
        assert!(!token.is_cancelled());
        assert!(engine.request_stop("s1").await);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_request_stop_on_idle_session_is_noop() {
        let engine = ClickerEngine::new();
        assert!(!engine.request_stop("nobody").await);
        // A later run starts with a fresh, uncancelled token.
        let token = engine.begin_run("nobody").await.unwrap();
        assert!(!token.is_cancelled());
    }
}
