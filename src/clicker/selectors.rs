//! CSS selectors for the click roles, as a config section with fixed defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorCatalog {
    /// Elements the sequence ultimately clicks
    #[serde(default = "default_primary_target")]
    pub primary_target: String,

    /// Elements that trigger asynchronous content loads
    #[serde(default = "default_trigger")]
    pub trigger: String,

    /// Tab strip clicked during the mode-3 sweep
    #[serde(default = "default_secondary_tab")]
    pub secondary_tab: String,
}

impl Default for SelectorCatalog {
    fn default() -> Self {
        Self {
            primary_target: default_primary_target(),
            trigger: default_trigger(),
            secondary_tab: default_secondary_tab(),
        }
    }
}

fn default_primary_target() -> String {
    ".class1.class2.class3".to_string()
}

fn default_trigger() -> String {
    ".class4".to_string()
}

fn default_secondary_tab() -> String {
    ".y-tab".to_string()
}
