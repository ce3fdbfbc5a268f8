//! Mutation requests and their outcome

use crate::domain::entities::{Contract, Milestone, MilestoneDraft, MilestonePatch};
use crate::domain::services::Transition;
use crate::domain::value_objects::{MilestoneId, MilestoneStatus};

/// One milestone mutation applied to a contract
#[derive(Debug, Clone, PartialEq)]
pub enum MilestoneOperation {
    Add(MilestoneDraft),
    ChangeStatus {
        milestone: MilestoneId,
        status: MilestoneStatus,
    },
    Edit {
        milestone: MilestoneId,
        patch: MilestonePatch,
    },
    Delete {
        milestone: MilestoneId,
    },
}

impl MilestoneOperation {
    /// Existing milestone the operation refers to (none for `Add`)
    pub fn target(&self) -> Option<MilestoneId> {
        match self {
            MilestoneOperation::Add(_) => None,
            MilestoneOperation::ChangeStatus { milestone, .. }
            | MilestoneOperation::Edit { milestone, .. }
            | MilestoneOperation::Delete { milestone } => Some(*milestone),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MilestoneOperation::Add(_) => "add",
            MilestoneOperation::ChangeStatus { .. } => "change_status",
            MilestoneOperation::Edit { .. } => "edit",
            MilestoneOperation::Delete { .. } => "delete",
        }
    }

    /// Whether the contract record (derived fields, sequence counter) changes
    pub(crate) fn writes_contract(&self) -> bool {
        !matches!(self, MilestoneOperation::Edit { .. })
    }
}

/// Result of a committed mutation
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    /// Contract as stored after the commit
    pub contract: Contract,
    pub transition: Transition,
}

impl MutationOutcome {
    /// The targeted milestone, unless it was deleted
    pub fn milestone(&self) -> Option<&Milestone> {
        self.contract.milestone(self.transition.milestone)
    }
}
