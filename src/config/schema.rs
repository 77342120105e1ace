use crate::clicker::pacing::PacingConfig;
use crate::clicker::selectors::SelectorCatalog;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chrome executable path
    pub chrome_path: PathBuf,

    /// Local HTTP API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Delay table for the click sequencer
    #[serde(default)]
    pub pacing: PacingConfig,

    /// CSS selectors for the click roles
    #[serde(default)]
    pub selectors: SelectorCatalog,

    /// Launch Chrome headless by default
    #[serde(default)]
    pub headless: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chrome_path: Self::default_chrome_path(),
            api: ApiConfig::default(),
            pacing: PacingConfig::default(),
            selectors: SelectorCatalog::default(),
            headless: false,
        }
    }
}

impl AppConfig {
    /// Get default Chrome path based on platform
    fn default_chrome_path() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            PathBuf::from("C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe")
        }
        #[cfg(target_os = "macos")]
        {
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome")
        }
        #[cfg(target_os = "linux")]
        {
            PathBuf::from("/usr/bin/google-chrome")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listen port for the local control API (loopback only)
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Enable the API server
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
            enabled: true,
        }
    }
}

fn default_api_port() -> u16 {
    38491
}

fn default_true() -> bool {
    true
}
