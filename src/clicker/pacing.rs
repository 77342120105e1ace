//! Delay table for the click sequencer.
//!
//! Pacing is injected data rather than literals in the loop, so tests can
//! shrink the table or run under tokio's paused clock.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pacing section of the config file, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Pause after each click in the initial primary-target pass
    #[serde(default = "default_initial_target_interval")]
    pub initial_target_interval_ms: u64,

    /// Pause after clicking a trigger, waiting for async DOM updates
    #[serde(default = "default_trigger_settle")]
    pub trigger_settle_ms: u64,

    /// Pause after clicking a secondary tab during the mode-3 sweep
    #[serde(default = "default_tab_settle")]
    pub tab_settle_ms: u64,

    /// Pause between primary-target clicks after a trigger
    #[serde(default = "default_target_interval")]
    pub target_interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            initial_target_interval_ms: default_initial_target_interval(),
            trigger_settle_ms: default_trigger_settle(),
            tab_settle_ms: default_tab_settle(),
            target_interval_ms: default_target_interval(),
        }
    }
}

fn default_initial_target_interval() -> u64 {
    500
}

fn default_trigger_settle() -> u64 {
    3000
}

fn default_tab_settle() -> u64 {
    2000
}

fn default_target_interval() -> u64 {
    300
}

/// Resolved delay table handed to the sequencer.
#[derive(Debug, Clone, Copy)]
pub struct PacingPolicy {
    pub initial_target_interval: Duration,
    pub trigger_settle: Duration,
    pub tab_settle: Duration,
    pub target_interval: Duration,
}

impl From<&PacingConfig> for PacingPolicy {
    fn from(config: &PacingConfig) -> Self {
        Self {
            initial_target_interval: Duration::from_millis(config.initial_target_interval_ms),
            trigger_settle: Duration::from_millis(config.trigger_settle_ms),
            tab_settle: Duration::from_millis(config.tab_settle_ms),
            target_interval: Duration::from_millis(config.target_interval_ms),
        }
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        (&PacingConfig::default()).into()
    }
}
