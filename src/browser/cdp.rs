//! CDP client using raw WebSocket for better Chrome compatibility.

use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

/// Global port counter for CDP connections (starts at 9222, increments for each launch)
static CDP_PORT_COUNTER: AtomicU16 = AtomicU16::new(9222);

/// Get next available CDP port
fn get_next_cdp_port() -> u16 {
    let port = CDP_PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
    // Wrap around if we exceed practical port range
    if port > 65500 {
        CDP_PORT_COUNTER.store(9222, Ordering::SeqCst);
        return 9222;
    }
    port
}

type WsSink = futures::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    WsMessage,
>;

pub struct CdpClient {
    /// WebSocket sender
    ws_tx: Option<Arc<Mutex<WsSink>>>,
    /// Response routing: command id to waiting sender
    responses: Arc<Mutex<HashMap<u32, tokio::sync::oneshot::Sender<serde_json::Value>>>>,
    /// Chrome process ID if we launched it
    chrome_pid: Option<u32>,
    /// Owning session id (log context)
    session_id: String,
    /// Message ID counter
    msg_id: Arc<Mutex<u32>>,
    /// CDP port in use
    cdp_port: u16,
}

impl CdpClient {
    /// Launch Chrome with CDP enabled and connect to its first page target.
    pub async fn launch(
        session_id: String,
        chrome_path: &Path,
        headless: bool,
    ) -> Result<Self, String> {
        let cdp_port = get_next_cdp_port();
        let mut client = Self {
            ws_tx: None,
            responses: Arc::new(Mutex::new(HashMap::new())),
            chrome_pid: None,
            session_id,
            msg_id: Arc::new(Mutex::new(1)),
            cdp_port,
        };

        let mut cmd = Command::new(chrome_path);

        // Dedicated throwaway profile per session
        let user_data_dir = std::env::temp_dir().join(format!("webpluck-{}", client.session_id));
        cmd.arg(format!("--user-data-dir={}", user_data_dir.display()));
        cmd.arg(format!("--remote-debugging-port={}", cdp_port));

        if headless {
            cmd.arg("--headless=new");
            cmd.arg("--disable-gpu");
        }

        cmd.arg("--no-first-run");
        cmd.arg("--no-default-browser-check");
        cmd.arg("--disable-background-networking");
        cmd.arg("--disable-sync");

        // Start at about:blank to avoid loading a page
        cmd.arg("about:blank");

        let child = cmd
            .spawn()
            .map_err(|e| format!("Failed to launch Chrome: {}", e))?;
        client.chrome_pid = Some(child.id());

        client.connect().await?;
        Ok(client)
    }

    /// Attach to an already-running Chrome exposing CDP on `cdp_port`.
    pub async fn attach(session_id: String, cdp_port: u16) -> Result<Self, String> {
        let mut client = Self {
            ws_tx: None,
            responses: Arc::new(Mutex::new(HashMap::new())),
            chrome_pid: None,
            session_id,
            msg_id: Arc::new(Mutex::new(1)),
            cdp_port,
        };
        client.connect().await?;
        Ok(client)
    }

    pub fn cdp_port(&self) -> u16 {
        self.cdp_port
    }

    pub fn is_connected(&self) -> bool {
        self.ws_tx.is_some()
    }

    /// Find the first page target and open the command WebSocket.
    async fn connect(&mut self) -> Result<(), String> {
        let mut retries = 0;
        const MAX_RETRIES: u32 = 30;
        let mut last_error = String::new();

        while retries < MAX_RETRIES {
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;

            let list_url = format!("http://localhost:{}/json/list", self.cdp_port);

            match reqwest::get(&list_url).await {
                Ok(response) if response.status().is_success() => {
                    match response.json::<serde_json::Value>().await {
                        Ok(targets) => {
                            let page_target = targets.as_array().and_then(|arr| {
                                arr.iter().find(|t| {
                                    t.get("type").and_then(|v| v.as_str()) == Some("page")
                                })
                            });

                            if let Some(target) = page_target {
                                if let Some(ws_url) =
                                    target.get("webSocketDebuggerUrl").and_then(|v| v.as_str())
                                {
                                    match connect_async(ws_url).await {
                                        Ok((ws_stream, _)) => {
                                            let (tx, mut rx) = StreamExt::split(ws_stream);
                                            self.ws_tx = Some(Arc::new(Mutex::new(tx)));

                                            let responses = self.responses.clone();

                                            // Route incoming responses to their waiting senders
                                            tokio::spawn(async move {
                                                while let Some(msg) = StreamExt::next(&mut rx).await
                                                {
                                                    match msg {
                                                        Ok(WsMessage::Text(text)) => {
                                                            if let Ok(json) = serde_json::from_str::<
                                                                serde_json::Value,
                                                            >(
                                                                &text
                                                            ) {
                                                                if let Some(id) = json
                                                                    .get("id")
                                                                    .and_then(|i| i.as_u64())
                                                                {
                                                                    if let Some(sender) = responses
                                                                        .lock()
                                                                        .await
                                                                        .remove(&(id as u32))
                                                                    {
                                                                        let _ = sender.send(json);
                                                                    }
                                                                }
                                                            }
                                                        }
                                                        Ok(WsMessage::Close(_)) => {
                                                            tracing::debug!("WebSocket closed");
                                                            break;
                                                        }
                                                        Err(e) => {
                                                            tracing::debug!(
                                                                "WebSocket error: {:?}",
                                                                e
                                                            );
                                                        }
                                                        _ => {}
                                                    }
                                                }
                                            });

                                            tracing::info!(
                                                "CDP connected for session {} on port {}",
                                                self.session_id,
                                                self.cdp_port
                                            );

                                            self.send_command("Page.enable", json!({})).await?;
                                            self.send_command("Runtime.enable", json!({})).await?;

                                            return Ok(());
                                        }
                                        Err(e) => {
                                            last_error =
                                                format!("Failed to connect WebSocket: {}", e);
                                        }
                                    }
                                } else {
                                    last_error =
                                        "No webSocketDebuggerUrl in page target".to_string();
                                }
                            } else {
                                last_error = "No page target found".to_string();
                            }
                        }
                        Err(e) => {
                            last_error = format!("Failed to parse targets response: {}", e);
                        }
                    }
                }
                Ok(response) => {
                    last_error = format!("HTTP error: {}", response.status());
                }
                Err(e) => {
                    last_error = format!("Connection error: {}", e);
                }
            }

            retries += 1;
            tracing::debug!("Retry {}/{}: {}", retries, MAX_RETRIES, last_error);
        }

        Err(format!(
            "Failed to connect to Chrome after {} retries: {}",
            MAX_RETRIES, last_error
        ))
    }

    /// Send a CDP command and wait for response
    async fn send_command(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let tx = self.ws_tx.as_ref().ok_or("WebSocket not connected")?;

        let (id, rx) = {
            let mut msg_id = self.msg_id.lock().await;
            *msg_id += 1;
            let id = *msg_id - 1;

            let (tx, rx) = tokio::sync::oneshot::channel();
            self.responses.lock().await.insert(id, tx);
            (id, rx)
        };

        let command = json!({
            "id": id,
            "method": method,
            "params": params
        });

        let mut tx_guard = tx.lock().await;
        tx_guard
            .send(WsMessage::Text(command.to_string()))
            .await
            .map_err(|e| format!("Failed to send command: {}", e))?;
        drop(tx_guard);

        match tokio::time::timeout(tokio::time::Duration::from_secs(30), rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err("Response channel closed".to_string()),
            Err(_) => Err("Command timeout".to_string()),
        }
    }

    /// Evaluate a JS expression and return its value.
    async fn evaluate(&self, expression: String) -> Result<serde_json::Value, String> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true
                }),
            )
            .await?;

        Ok(result
            .get("result")
            .and_then(|r| r.get("result"))
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    /// Navigate to a URL
    pub async fn navigate(&self, url: &str) -> Result<(), String> {
        let _ = self
            .send_command("Page.navigate", json!({"url": url}))
            .await?;
        tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
        tracing::info!("Navigated to: {}", url);
        Ok(())
    }

    /// Get current URL from browser
    pub async fn url(&self) -> Result<String, String> {
        let value = self.evaluate("window.location.href".to_string()).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Get page title (empty string when unset)
    pub async fn title(&self) -> Result<String, String> {
        let value = self.evaluate("document.title || ''".to_string()).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Whether document and body exist
    pub async fn dom_ready(&self) -> Result<bool, String> {
        let value = self
            .evaluate("!!(document && document.body)".to_string())
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Number of elements matching a selector
    pub async fn count_matches(&self, selector: &str) -> Result<usize, String> {
        let escaped = escape_selector(selector);
        let value = self
            .evaluate(format!(
                "document.querySelectorAll('{}').length",
                escaped
            ))
            .await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    /// Click the index-th element matching a selector. False when absent or
    /// not clickable.
    pub async fn click_nth(&self, selector: &str, index: usize) -> Result<bool, String> {
        let escaped = escape_selector(selector);
        let value = self
            .evaluate(format!(
                "(function() {{ const els = document.querySelectorAll('{}'); const el = els[{}]; if (el && typeof el.click === 'function') {{ el.click(); return true; }} return false; }})()",
                escaped, index
            ))
            .await?;

        let clicked = value.as_bool().unwrap_or(false);
        if clicked {
            tracing::debug!("Clicked {}[{}]", selector, index);
        }
        Ok(clicked)
    }

    /// Close the WebSocket and kill Chrome if we started it.
    pub async fn close(&mut self) -> Result<(), String> {
        if let Some(tx) = self.ws_tx.take() {
            let mut tx_guard = tx.lock().await;
            let _ = tx_guard.close().await;
        }

        if let Some(pid) = self.chrome_pid.take() {
            kill_pid(pid);
        }

        tracing::info!("CDP client closed for session {}", self.session_id);
        Ok(())
    }
}

fn escape_selector(selector: &str) -> String {
    selector.replace('\\', "\\\\").replace('\'', "\\'")
}

fn kill_pid(pid: u32) {
    #[cfg(unix)]
    {
        let _ = Command::new("kill").arg(pid.to_string()).spawn();
    }
    #[cfg(windows)]
    {
        let _ = Command::new("taskkill")
            .args(["/PID", &pid.to_string(), "/F"])
            .spawn();
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        // Ensure Chrome is killed when client is dropped
        if let Some(pid) = self.chrome_pid {
            kill_pid(pid);
        }
    }
}
