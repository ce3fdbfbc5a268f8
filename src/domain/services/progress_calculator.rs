//! Progress calculation
//!
//! Progress is a plain count ratio over active (non-cancelled) milestones,
//! never weighted by amount.

use crate::domain::entities::Milestone;
use crate::domain::value_objects::{MilestoneStatus, Progress};

/// Completed and active milestone counts of one contract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCounts {
    pub completed: usize,
    pub active: usize,
}

impl ProgressCounts {
    pub fn from_milestones(milestones: &[Milestone]) -> Self {
        milestones
            .iter()
            .fold(Self::default(), |mut counts, milestone| {
                if milestone.status().is_active() {
                    counts.active += 1;
                }
                if milestone.status() == MilestoneStatus::Completed {
                    counts.completed += 1;
                }
                counts
            })
    }
}

/// Pure progress function
pub struct ProgressCalculator;

impl ProgressCalculator {
    /// `100 * completed / active`, or 0 when nothing is active
    pub fn compute(completed: usize, active: usize) -> Progress {
        if active == 0 {
            return Progress::ZERO;
        }
        Progress::new(100.0 * completed as f64 / active as f64)
    }

    pub fn from_counts(counts: ProgressCounts) -> Progress {
        Self::compute(counts.completed, counts.active)
    }

    pub fn for_milestones(milestones: &[Milestone]) -> Progress {
        Self::from_counts(ProgressCounts::from_milestones(milestones))
    }
}
