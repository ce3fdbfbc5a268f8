//! Milestone entity
//!
//! A milestone is exclusively owned by one contract. Its status only changes
//! through [`MilestoneLifecycle`](crate::domain::services::MilestoneLifecycle),
//! which is why every mutator here is restricted to the domain layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{require_amount, require_name, ValidationError};
use crate::domain::value_objects::{ContractId, MilestoneId, MilestoneStatus};

/// Input for creating a milestone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestoneDraft {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to 0 when unspecified
    pub amount: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl MilestoneDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// The checks [`Milestone`] creation applies, without building one
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_name("title", &self.title)?;
        require_amount("amount", self.amount.unwrap_or(0.0))?;
        Ok(())
    }
}

/// Partial update of the informational milestone fields
///
/// Absent fields keep their current value. Status, `paid` and `progress`
/// cannot be expressed in a patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestonePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl MilestonePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.amount.is_none()
            && self.due_date.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    id: MilestoneId,
    contract_id: ContractId,
    /// Creation order within the contract
    sequence: u64,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    amount: f64,
    status: MilestoneStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Milestone {
    pub(in crate::domain) fn create(
        id: MilestoneId,
        contract_id: ContractId,
        sequence: u64,
        draft: MilestoneDraft,
        status: MilestoneStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = require_name("title", &draft.title)?;
        let amount = require_amount("amount", draft.amount.unwrap_or(0.0))?;
        Ok(Self {
            id,
            contract_id,
            sequence,
            title,
            description: draft.description.unwrap_or_default(),
            amount,
            status,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> MilestoneId {
        self.id
    }

    pub fn contract_id(&self) -> ContractId {
        self.contract_id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn status(&self) -> MilestoneStatus {
        self.status
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(in crate::domain) fn set_status(&mut self, status: MilestoneStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    /// Validates the whole patch before touching any field
    pub(in crate::domain) fn apply_patch(
        &mut self,
        patch: MilestonePatch,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let title = patch
            .title
            .as_deref()
            .map(|t| require_name("title", t))
            .transpose()?;
        let amount = patch
            .amount
            .map(|a| require_amount("amount", a))
            .transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(amount) = amount {
            self.amount = amount;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        self.updated_at = now;
        Ok(())
    }
}
