//! CDP session pool keyed by session id.
//! Launch or attach on create, explicit close, periodic liveness sweep.

use crate::browser::cdp::CdpClient;
use crate::error::{Result, WebpluckError};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type ClientHandle = Arc<Mutex<CdpClient>>;

struct SessionEntry {
    handle: ClientHandle,
    cdp_port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub cdp_port: u16,
    pub url: String,
}

#[derive(Default)]
pub struct SessionManager {
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch a fresh Chrome for a new session. Returns the session id and
    /// the CDP port it serves.
    pub async fn launch(&self, chrome_path: &Path, headless: bool) -> Result<(String, u16)> {
        let id = uuid::Uuid::new_v4().to_string();
        let client = CdpClient::launch(id.clone(), chrome_path, headless)
            .await
            .map_err(WebpluckError::Cdp)?;
        let cdp_port = client.cdp_port();

        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            id.clone(),
            SessionEntry {
                handle: Arc::new(Mutex::new(client)),
                cdp_port,
            },
        );
        Ok((id, cdp_port))
    }

    /// Attach a new session to an already-running Chrome.
    pub async fn attach(&self, cdp_port: u16) -> Result<(String, u16)> {
        let id = uuid::Uuid::new_v4().to_string();
        let client = CdpClient::attach(id.clone(), cdp_port)
            .await
            .map_err(WebpluckError::Cdp)?;

        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            id.clone(),
            SessionEntry {
                handle: Arc::new(Mutex::new(client)),
                cdp_port,
            },
        );
        Ok((id, cdp_port))
    }

    /// Get the client handle for a session.
    /// The returned `Arc<Mutex<CdpClient>>` can be locked independently of
    /// the session map, so sessions operate in parallel.
    pub async fn get(&self, session_id: &str) -> Result<ClientHandle> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .map(|entry| Arc::clone(&entry.handle))
            .ok_or_else(|| WebpluckError::SessionNotFound(session_id.to_string()))
    }

    /// Close a single session.
    pub async fn close(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions
            .remove(session_id)
            .ok_or_else(|| WebpluckError::SessionNotFound(session_id.to_string()))?;
        let mut client = entry.handle.lock().await;
        let _ = client.close().await;
        tracing::info!("Closed session {}", session_id);
        Ok(())
    }

    /// Close all sessions (e.g. on shutdown).
    pub async fn close_all(&self) {
        let mut sessions = self.sessions.lock().await;
        for (id, entry) in sessions.drain() {
            let mut client = entry.handle.lock().await;
            let _ = client.close().await;
            tracing::info!("Closed session {}", id);
        }
    }

    /// List open sessions with their current URLs.
    pub async fn list(&self) -> Vec<SessionInfo> {
        let entries: Vec<(String, ClientHandle, u16)> = {
            let sessions = self.sessions.lock().await;
            sessions
                .iter()
                .map(|(id, e)| (id.clone(), Arc::clone(&e.handle), e.cdp_port))
                .collect()
        };

        let mut infos = Vec::with_capacity(entries.len());
        for (id, handle, cdp_port) in entries {
            let url = handle.lock().await.url().await.unwrap_or_default();
            infos.push(SessionInfo { id, cdp_port, url });
        }
        infos
    }

    /// Probe each session's CDP endpoint and drop dead ones.
    /// Returns the ids that were removed.
    pub async fn sweep_dead(&self) -> Vec<String> {
        let probes: Vec<(String, u16)> = {
            let sessions = self.sessions.lock().await;
            sessions
                .iter()
                .map(|(id, e)| (id.clone(), e.cdp_port))
                .collect()
        };

        let mut dead = Vec::new();
        for (id, cdp_port) in probes {
            let url = format!("http://127.0.0.1:{}/json/version", cdp_port);
            let alive = matches!(reqwest::get(&url).await, Ok(r) if r.status().is_success());
            if !alive {
                dead.push(id);
            }
        }

        if !dead.is_empty() {
            let mut sessions = self.sessions.lock().await;
            for id in &dead {
                if let Some(entry) = sessions.remove(id) {
                    let mut client = entry.handle.lock().await;
                    let _ = client.close().await;
                }
            }
        }
        dead
    }
}
