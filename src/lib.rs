pub mod api;
pub mod browser;
pub mod clicker;
pub mod config;
pub mod error;
pub mod state;

use state::AppState;
use std::sync::Arc;

/// Daemon entry point: load config, start the control API, sweep dead
/// sessions in the background. Runs until the server exits.
pub async fn run() -> Result<(), String> {
    // Load configuration (never overwrite existing file on failure)
    let config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(
                "Failed to load config: {}. Using in-memory defaults (not saving).",
                e
            );
            config::AppConfig::default()
        }
    };

    if let Err(e) = config::validate_pacing(&config.pacing) {
        return Err(format!("Invalid pacing config: {}", e));
    }

    let state = Arc::new(AppState::new(config));

    // Background task: drop sessions whose Chrome has gone away, every 30s
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(30));
            loop {
                interval.tick().await;
                let removed = state.session_manager.sweep_dead().await;
                if !removed.is_empty() {
                    tracing::info!("Swept dead sessions: {:?}", removed);
                }
            }
        });
    }

    let port = state.config.read().api.port;
    api::run_server(state, port).await
}
