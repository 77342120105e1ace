//! Declarative step plan for one run.
//!
//! Mode behavior is data: the plan lists which trigger indices to process and
//! what follows each trigger click, so the sequencer's main loop never
//! branches on the mode itself.

use crate::clicker::mode::PageMode;

/// What happens after a trigger element has been clicked and the page settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Re-query primary targets and click every one of them.
    ClickAllTargets,
    /// Click only the first primary target, then end the whole sequence.
    ClickFirstTargetAndFinish,
    /// Click the listed secondary-tab indices, clicking each tab's primary
    /// targets after it settles.
    SweepTabs { tabs: Vec<usize> },
}

/// One planned trigger: which element to click and what to do afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerStep {
    pub trigger_index: usize,
    pub follow_up: FollowUp,
}

/// Ordered plan over the trigger elements found at sequence start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickPlan {
    pub steps: Vec<TriggerStep>,
}

impl ClickPlan {
    /// Build the plan for `trigger_count` live triggers under `mode`,
    /// excluding the mode's skip indices.
    pub fn build(mode: PageMode, trigger_count: usize) -> Self {
        let skips = mode.skip_indices();
        let steps = (0..trigger_count)
            .filter(|i| !skips.contains(i))
            .map(|trigger_index| TriggerStep {
                trigger_index,
                follow_up: follow_up_for(mode, trigger_index),
            })
            .collect();
        Self { steps }
    }
}

fn follow_up_for(mode: PageMode, trigger_index: usize) -> FollowUp {
    match (mode, trigger_index) {
        (PageMode::Mode1Or2, 1) => FollowUp::ClickFirstTargetAndFinish,
        (PageMode::Mode3, 0) => FollowUp::SweepTabs { tabs: vec![3, 4, 5] },
        _ => FollowUp::ClickAllTargets,
    }
}
