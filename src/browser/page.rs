//! The seam between the click sequencer and a live document.
//!
//! The sequencer only ever needs four questions answered about a page, so it
//! talks to this trait instead of the CDP client directly; tests substitute an
//! in-memory implementation.

use crate::browser::cdp::CdpClient;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait Page: Send + Sync {
    /// Whether the document and its body exist.
    async fn dom_ready(&self) -> Result<bool, String>;

    /// Current document title (empty string when unset).
    async fn title(&self) -> Result<String, String>;

    /// Number of elements currently matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize, String>;

    /// Click the `index`-th element matching `selector`. Returns false when
    /// the element is absent or not clickable; that is not an error.
    async fn click_nth(&self, selector: &str, index: usize) -> Result<bool, String>;
}

/// `Page` over a pooled CDP client handle. Locks the client per call so the
/// session pool can hand the same handle to other tasks between steps.
pub struct CdpPage {
    client: Arc<Mutex<CdpClient>>,
}

impl CdpPage {
    pub fn new(client: Arc<Mutex<CdpClient>>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Page for CdpPage {
    async fn dom_ready(&self) -> Result<bool, String> {
        self.client.lock().await.dom_ready().await
    }

    async fn title(&self) -> Result<String, String> {
        self.client.lock().await.title().await
    }

    async fn count(&self, selector: &str) -> Result<usize, String> {
        self.client.lock().await.count_matches(selector).await
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<bool, String> {
        self.client.lock().await.click_nth(selector, index).await
    }
}
