//! Milestone status value object
//!
//! The four-state milestone lifecycle:
//!
//! ```text
//! PENDING ──► IN_PROGRESS ──► COMPLETED
//!    │             │
//!    └──────┬──────┘
//!           ▼
//!       CANCELLED
//! ```

use serde::{Deserialize, Serialize};

/// Lifecycle status of a milestone
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStatus {
    /// Waiting for earlier milestones
    #[default]
    Pending,
    /// The contract's single active milestone
    #[value(alias = "in_progress")]
    InProgress,
    /// Done; its amount has been credited to the contract
    Completed,
    /// Dropped; excluded from progress
    Cancelled,
}

impl MilestoneStatus {
    pub const ALL: [MilestoneStatus; 4] = [
        MilestoneStatus::Pending,
        MilestoneStatus::InProgress,
        MilestoneStatus::Completed,
        MilestoneStatus::Cancelled,
    ];

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, MilestoneStatus::Completed | MilestoneStatus::Cancelled)
    }

    /// Counted in the progress denominator
    pub fn is_active(&self) -> bool {
        !matches!(self, MilestoneStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "PENDING",
            MilestoneStatus::InProgress => "IN_PROGRESS",
            MilestoneStatus::Completed => "COMPLETED",
            MilestoneStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MilestoneStatus {
    type Err = String;

    /// Accepts `IN_PROGRESS`, `in-progress`, `in_progress` and friends
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown milestone status '{}'", s))
    }
}
