//! The click sequencer: one bounded click+wait+requery pass over a page.
//!
//! One run is a single cooperative async task. It suspends only at the timed
//! pauses in the pacing table and polls its cancel token at fixed checkpoints,
//! so a stop request is observed with at most one pause-interval of latency.

use crate::browser::page::Page;
use crate::clicker::cancel::CancelToken;
use crate::clicker::mode::PageMode;
use crate::clicker::pacing::PacingPolicy;
use crate::clicker::plan::{ClickPlan, FollowUp, TriggerStep};
use crate::clicker::selectors::SelectorCatalog;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Stopped,
    Error,
}

/// Aggregate outcome of one run, produced exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub status: RunStatus,
    pub target_click_count: usize,
    pub trigger_processed_count: usize,
    pub mode: PageMode,
    pub message: String,
}

impl RunResult {
    fn error(mode: PageMode, message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Error,
            target_click_count: 0,
            trigger_processed_count: 0,
            mode,
            message: message.into(),
        }
    }
}

/// Mutable counters scoped to one invocation.
struct RunState<'a> {
    cancel: &'a CancelToken,
    /// True once any checkpoint observed the token set.
    stopped: bool,
    target_clicks: usize,
    triggers_processed: usize,
}

impl<'a> RunState<'a> {
    fn new(cancel: &'a CancelToken) -> Self {
        Self {
            cancel,
            stopped: false,
            target_clicks: 0,
            triggers_processed: 0,
        }
    }

    /// Cancellation checkpoint. Latches `stopped` on first observation.
    fn checkpoint(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            self.stopped = true;
        }
        self.stopped
    }

    fn into_result(self, mode: PageMode) -> RunResult {
        let (status, message) = if self.stopped {
            (RunStatus::Stopped, "operation stopped")
        } else {
            (RunStatus::Success, "operation completed")
        };
        RunResult {
            status,
            target_click_count: self.target_clicks,
            trigger_processed_count: self.triggers_processed,
            mode,
            message: message.to_string(),
        }
    }
}

/// What one trigger step tells the main loop to do next.
enum StepOutcome {
    Continue,
    Finished,
}

/// Run the full sequence against `page`. Never panics and never returns an
/// `Err`: every failure degrades to a `RunResult` with `status: error`.
pub async fn run(
    page: &dyn Page,
    catalog: &SelectorCatalog,
    pacing: &PacingPolicy,
    cancel: &CancelToken,
) -> RunResult {
    match page.dom_ready().await {
        Ok(true) => {}
        Ok(false) => return RunResult::error(PageMode::Default, "DOM not ready"),
        Err(e) => return RunResult::error(PageMode::Default, e),
    }

    let title = match page.title().await {
        Ok(t) => t,
        Err(e) => return RunResult::error(PageMode::Default, e),
    };
    let mode = PageMode::detect(&title);
    tracing::info!("Page title {:?}, detected mode {}", title, mode);

    let mut state = RunState::new(cancel);
    match drive(page, catalog, pacing, mode, &mut state).await {
        Ok(()) => state.into_result(mode),
        Err(e) => {
            tracing::error!("Click sequence failed: {}", e);
            RunResult {
                status: RunStatus::Error,
                target_click_count: state.target_clicks,
                trigger_processed_count: state.triggers_processed,
                mode,
                message: e,
            }
        }
    }
}

async fn drive(
    page: &dyn Page,
    catalog: &SelectorCatalog,
    pacing: &PacingPolicy,
    mode: PageMode,
    state: &mut RunState<'_>,
) -> Result<(), String> {
    // Initial pass: click the primary targets already on the page.
    let initial_count = page.count(&catalog.primary_target).await?;
    tracing::info!("Found {} initial target elements", initial_count);
    for i in 0..initial_count {
        if state.checkpoint() {
            break;
        }
        if page.click_nth(&catalog.primary_target, i).await? {
            state.target_clicks += 1;
            sleep(pacing.initial_target_interval).await;
        }
    }

    let trigger_count = page.count(&catalog.trigger).await?;
    let plan = ClickPlan::build(mode, trigger_count);
    tracing::info!(
        "Found {} trigger elements, processing {} (skips excluded)",
        trigger_count,
        plan.steps.len()
    );

    for step in &plan.steps {
        if state.checkpoint() {
            break;
        }
        match process_trigger(page, catalog, pacing, step, state).await {
            Ok(StepOutcome::Finished) => break,
            Ok(StepOutcome::Continue) => {}
            // One bad step must not abort the run.
            Err(e) => {
                tracing::warn!(
                    "Trigger element {} failed, continuing: {}",
                    step.trigger_index + 1,
                    e
                );
            }
        }
    }

    Ok(())
}

async fn process_trigger(
    page: &dyn Page,
    catalog: &SelectorCatalog,
    pacing: &PacingPolicy,
    step: &TriggerStep,
    state: &mut RunState<'_>,
) -> Result<StepOutcome, String> {
    tracing::debug!("Processing trigger element {}", step.trigger_index + 1);

    if !page.click_nth(&catalog.trigger, step.trigger_index).await? {
        // Element gone or not clickable; nothing was processed.
        return Ok(StepOutcome::Continue);
    }
    state.triggers_processed += 1;

    // Let the page finish its asynchronous updates.
    sleep(pacing.trigger_settle).await;
    if state.checkpoint() {
        return Ok(StepOutcome::Continue);
    }

    match &step.follow_up {
        FollowUp::ClickFirstTargetAndFinish => {
            let count = page.count(&catalog.primary_target).await?;
            if count > 0 && page.click_nth(&catalog.primary_target, 0).await? {
                state.target_clicks += 1;
            }
            Ok(StepOutcome::Finished)
        }
        FollowUp::SweepTabs { tabs } => {
            let tab_count = page.count(&catalog.secondary_tab).await?;
            tracing::info!("Found {} secondary tab elements", tab_count);
            for &tab_index in tabs {
                if state.checkpoint() {
                    break;
                }
                if page.click_nth(&catalog.secondary_tab, tab_index).await? {
                    sleep(pacing.tab_settle).await;
                    if state.checkpoint() {
                        break;
                    }
                    click_all_targets(page, catalog, pacing, state).await?;
                }
            }
            Ok(StepOutcome::Continue)
        }
        FollowUp::ClickAllTargets => {
            click_all_targets(page, catalog, pacing, state).await?;
            Ok(StepOutcome::Continue)
        }
    }
}

/// Re-query the primary targets and click each, pacing between clicks.
async fn click_all_targets(
    page: &dyn Page,
    catalog: &SelectorCatalog,
    pacing: &PacingPolicy,
    state: &mut RunState<'_>,
) -> Result<(), String> {
    let count = page.count(&catalog.primary_target).await?;
    tracing::debug!("Found {} target elements after trigger", count);
    for i in 0..count {
        if state.checkpoint() {
            break;
        }
        if page.click_nth(&catalog.primary_target, i).await? {
            state.target_clicks += 1;
            sleep(pacing.target_interval).await;
        }
    }
    Ok(())
}
