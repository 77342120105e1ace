//! The multi-step DOM-interaction sequencer and its supporting data.

pub mod cancel;
pub mod engine;
pub mod mode;
pub mod pacing;
pub mod plan;
pub mod selectors;
pub mod sequencer;

pub use cancel::CancelToken;
pub use engine::ClickerEngine;
pub use mode::PageMode;
pub use pacing::{PacingConfig, PacingPolicy};
pub use selectors::SelectorCatalog;
pub use sequencer::{RunResult, RunStatus};
