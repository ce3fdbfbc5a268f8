//! Milestone lifecycle
//!
//! Applies one milestone mutation to an in-memory [`Contract`] aggregate:
//! validates the status transition, promotes the next pending milestone when
//! the active one leaves `IN_PROGRESS`, and settles `paid` and `progress`.
//!
//! This is the only code that writes the contract's derived fields.
//!
//! ```text
//! PENDING ──► IN_PROGRESS ──► COMPLETED      (paid += amount)
//!    │             │
//!    └──────┬──────┘
//!           ▼
//!       CANCELLED
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::progress_calculator::ProgressCalculator;
use crate::domain::entities::{Contract, Milestone, MilestoneDraft, MilestonePatch, ValidationError};
use crate::domain::value_objects::{ContractId, MilestoneId, MilestoneStatus, Progress};

/// Why a status change was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionReason {
    /// The milestone already has the requested status
    Unchanged,
    /// `COMPLETED` and `CANCELLED` are final
    Terminal,
    /// `IN_PROGRESS` cannot return to `PENDING`
    Backwards,
    /// A pending milestone must be started before it can complete
    NotStarted,
    /// Another milestone is already `IN_PROGRESS`
    ActiveElsewhere { active: MilestoneId },
    /// An earlier pending milestone has to be started first
    OutOfOrder { earliest: MilestoneId },
}

impl std::fmt::Display for TransitionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionReason::Unchanged => write!(f, "milestone is already in this status"),
            TransitionReason::Terminal => write!(f, "status is final"),
            TransitionReason::Backwards => write!(f, "a started milestone cannot become pending"),
            TransitionReason::NotStarted => write!(f, "milestone has not been started"),
            TransitionReason::ActiveElsewhere { active } => {
                write!(f, "milestone {} is already in progress", active)
            }
            TransitionReason::OutOfOrder { earliest } => {
                write!(f, "milestone {} must be started first", earliest)
            }
        }
    }
}

/// Errors returned by [`MilestoneLifecycle`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("milestone {milestone} not found in contract {contract}")]
    MilestoneNotFound {
        contract: ContractId,
        milestone: MilestoneId,
    },

    #[error("milestone {milestone} belongs to contract {owner}, not contract {contract}")]
    InvalidContractReference {
        contract: ContractId,
        milestone: MilestoneId,
        owner: ContractId,
    },

    #[error("cannot change milestone {milestone} from {from} to {to}: {reason}")]
    InvalidTransition {
        milestone: MilestoneId,
        from: MilestoneStatus,
        to: MilestoneStatus,
        reason: TransitionReason,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// What one lifecycle operation changed
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The milestone the operation targeted
    pub milestone: MilestoneId,
    /// Milestones that must be written back (target first, then promoted)
    pub written: Vec<MilestoneId>,
    /// Milestone removed from the contract
    pub removed: Option<MilestoneId>,
    /// Milestone moved to `IN_PROGRESS` as a side effect
    pub promoted: Option<MilestoneId>,
    /// Change actually applied to `paid`
    pub paid_delta: f64,
    pub progress_before: Progress,
    pub progress_after: Progress,
}

/// Milestone state machine and sole writer of `paid`/`progress`
pub struct MilestoneLifecycle;

impl MilestoneLifecycle {
    /// Append a new milestone
    ///
    /// It starts `IN_PROGRESS` when the contract has no non-cancelled
    /// milestone, `PENDING` otherwise.
    pub fn create(
        contract: &mut Contract,
        id: MilestoneId,
        draft: MilestoneDraft,
        now: DateTime<Utc>,
    ) -> Result<Transition, LifecycleError> {
        let status = if contract.active_count() == 0 {
            MilestoneStatus::InProgress
        } else {
            MilestoneStatus::Pending
        };
        let sequence = contract.record().next_sequence();
        let milestone = Milestone::create(id, contract.id(), sequence, draft, status, now)?;

        let progress_before = contract.progress();
        contract.record_mut().take_sequence();
        contract.milestones_mut().push(milestone);
        let (paid_delta, progress_after) = settle(contract, 0.0, now);

        Ok(Transition {
            milestone: id,
            written: vec![id],
            removed: None,
            promoted: None,
            paid_delta,
            progress_before,
            progress_after,
        })
    }

    /// Move a milestone to `to`
    pub fn change_status(
        contract: &mut Contract,
        id: MilestoneId,
        to: MilestoneStatus,
        now: DateTime<Utc>,
    ) -> Result<Transition, LifecycleError> {
        let index = position(contract, id)?;
        let from = contract.milestones()[index].status();
        check_transition(contract, id, from, to)?;

        let progress_before = contract.progress();
        let milestone = &mut contract.milestones_mut()[index];
        milestone.set_status(to, now);
        let credit = if to == MilestoneStatus::Completed {
            milestone.amount()
        } else {
            0.0
        };

        let promoted = if from == MilestoneStatus::InProgress {
            promote_next(contract, now)
        } else {
            None
        };
        let (paid_delta, progress_after) = settle(contract, credit, now);

        let mut written = vec![id];
        written.extend(promoted);
        Ok(Transition {
            milestone: id,
            written,
            removed: None,
            promoted,
            paid_delta,
            progress_before,
            progress_after,
        })
    }

    /// Update informational fields; status and derived fields are untouched
    pub fn edit(
        contract: &mut Contract,
        id: MilestoneId,
        patch: MilestonePatch,
        now: DateTime<Utc>,
    ) -> Result<Transition, LifecycleError> {
        let index = position(contract, id)?;
        contract.milestones_mut()[index].apply_patch(patch, now)?;

        let progress = contract.progress();
        Ok(Transition {
            milestone: id,
            written: vec![id],
            removed: None,
            promoted: None,
            paid_delta: 0.0,
            progress_before: progress,
            progress_after: progress,
        })
    }

    /// Remove a milestone, debiting its amount if it was completed
    pub fn delete(
        contract: &mut Contract,
        id: MilestoneId,
        now: DateTime<Utc>,
    ) -> Result<Transition, LifecycleError> {
        let index = position(contract, id)?;
        let progress_before = contract.progress();
        let removed = contract.milestones_mut().remove(index);

        let debit = if removed.status() == MilestoneStatus::Completed {
            -removed.amount()
        } else {
            0.0
        };
        let promoted = if removed.status() == MilestoneStatus::InProgress {
            promote_next(contract, now)
        } else {
            None
        };
        let (paid_delta, progress_after) = settle(contract, debit, now);

        Ok(Transition {
            milestone: id,
            written: promoted.into_iter().collect(),
            removed: Some(id),
            promoted,
            paid_delta,
            progress_before,
            progress_after,
        })
    }
}

fn position(contract: &Contract, id: MilestoneId) -> Result<usize, LifecycleError> {
    contract
        .milestones()
        .iter()
        .position(|m| m.id() == id)
        .ok_or(LifecycleError::MilestoneNotFound {
            contract: contract.id(),
            milestone: id,
        })
}

fn check_transition(
    contract: &Contract,
    id: MilestoneId,
    from: MilestoneStatus,
    to: MilestoneStatus,
) -> Result<(), LifecycleError> {
    use MilestoneStatus::*;

    let reason = if from == to {
        Some(TransitionReason::Unchanged)
    } else if from.is_terminal() {
        Some(TransitionReason::Terminal)
    } else {
        match (from, to) {
            (InProgress, Pending) => Some(TransitionReason::Backwards),
            (Pending, Completed) => Some(TransitionReason::NotStarted),
            (Pending, InProgress) => start_blocker(contract, id),
            _ => None,
        }
    };

    match reason {
        Some(reason) => Err(LifecycleError::InvalidTransition {
            milestone: id,
            from,
            to,
            reason,
        }),
        None => Ok(()),
    }
}

/// A pending milestone may only start when nothing is active and every
/// earlier milestone is settled
fn start_blocker(contract: &Contract, id: MilestoneId) -> Option<TransitionReason> {
    if let Some(active) = contract.active_milestone() {
        return Some(TransitionReason::ActiveElsewhere {
            active: active.id(),
        });
    }
    contract
        .milestones()
        .iter()
        .find(|m| m.status() == MilestoneStatus::Pending)
        .filter(|earliest| earliest.id() != id)
        .map(|earliest| TransitionReason::OutOfOrder {
            earliest: earliest.id(),
        })
}

/// Start the earliest pending milestone if none is in progress
fn promote_next(contract: &mut Contract, now: DateTime<Utc>) -> Option<MilestoneId> {
    if contract.active_milestone().is_some() {
        return None;
    }
    let next = contract
        .milestones_mut()
        .iter_mut()
        .find(|m| m.status() == MilestoneStatus::Pending)?;
    next.set_status(MilestoneStatus::InProgress, now);
    Some(next.id())
}

/// Apply a paid adjustment (clamped at zero) and recompute progress from the
/// current milestone set. Returns the delta actually applied.
fn settle(contract: &mut Contract, paid_adjustment: f64, now: DateTime<Utc>) -> (f64, Progress) {
    let paid_before = contract.paid();
    let paid_after = (paid_before + paid_adjustment).max(0.0);
    let progress = ProgressCalculator::for_milestones(contract.milestones());

    contract
        .record_mut()
        .set_derived(paid_after, progress, now);
    (paid_after - paid_before, progress)
}
