use crate::browser::SessionManager;
use crate::clicker::ClickerEngine;
use crate::config::AppConfig;
use parking_lot::RwLock;
use std::sync::Arc;

/// Application global state
pub struct AppState {
    pub config: Arc<RwLock<AppConfig>>,
    pub session_manager: Arc<SessionManager>,
    pub engine: Arc<ClickerEngine>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            session_manager: Arc::new(SessionManager::new()),
            engine: Arc::new(ClickerEngine::new()),
        }
    }
}
