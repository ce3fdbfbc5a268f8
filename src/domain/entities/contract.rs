//! Contract entity and aggregate
//!
//! `ContractRecord` is the persisted contract row. `Contract` is the
//! aggregate: the record together with its milestones in creation order.
//!
//! `paid` and `progress` are derived from the milestone set. They have no
//! public setter; the only writer is the milestone lifecycle service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::milestone::Milestone;
use super::validation::{require_amount, require_name, ValidationError};
use crate::domain::value_objects::{
    ContractId, ContractKind, ContractStatus, MilestoneId, MilestoneStatus, Progress,
};

/// Contract owner contact details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Input for creating a contract
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewContract {
    pub title: String,
    pub description: Option<String>,
    pub owner: Owner,
    pub kind: Option<ContractKind>,
    pub status: Option<ContractStatus>,
    pub total: f64,
    pub start_date: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub next_deadline: Option<DateTime<Utc>>,
}

/// Partial update of client-editable contract fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
    pub kind: Option<ContractKind>,
    pub status: Option<ContractStatus>,
    pub total: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub next_deadline: Option<DateTime<Utc>>,
}

impl NewContract {
    /// The checks [`ContractRecord::create`] applies
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_name("title", &self.title)?;
        require_name("owner name", &self.owner.name)?;
        require_amount("total", self.total)?;
        Ok(())
    }
}

impl ContractPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    id: ContractId,
    title: String,
    #[serde(default)]
    description: String,
    owner: Owner,
    #[serde(default)]
    kind: ContractKind,
    #[serde(default)]
    status: ContractStatus,
    total: f64,
    #[serde(default)]
    paid: f64,
    #[serde(default)]
    progress: Progress,
    start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_deadline: Option<DateTime<Utc>>,
    /// Sequence number handed to the next milestone created
    #[serde(default = "first_sequence")]
    next_sequence: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn first_sequence() -> u64 {
    1
}

impl ContractRecord {
    /// Build a fresh contract; `paid` and `progress` start at zero
    pub fn create(
        id: ContractId,
        input: NewContract,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = require_name("title", &input.title)?;
        let owner_name = require_name("owner name", &input.owner.name)?;
        let total = require_amount("total", input.total)?;

        Ok(Self {
            id,
            title,
            description: input.description.unwrap_or_default(),
            owner: Owner {
                name: owner_name,
                ..input.owner
            },
            kind: input.kind.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            total,
            paid: 0.0,
            progress: Progress::ZERO,
            start_date: input.start_date.unwrap_or(now),
            deadline: input.deadline,
            next_deadline: input.next_deadline,
            next_sequence: first_sequence(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn status(&self) -> ContractStatus {
        self.status
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn paid(&self) -> f64 {
        self.paid
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.next_deadline
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply client edits. Derived fields are untouched.
    pub fn apply_patch(
        &mut self,
        patch: ContractPatch,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let title = patch
            .title
            .as_deref()
            .map(|t| require_name("title", t))
            .transpose()?;
        let owner_name = patch
            .owner_name
            .as_deref()
            .map(|n| require_name("owner name", n))
            .transpose()?;
        let total = patch
            .total
            .map(|t| require_amount("total", t))
            .transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(name) = owner_name {
            self.owner.name = name;
        }
        if let Some(email) = patch.owner_email {
            self.owner.email = Some(email);
        }
        if let Some(phone) = patch.owner_phone {
            self.owner.phone = Some(phone);
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(total) = total {
            self.total = total;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = Some(deadline);
        }
        if let Some(next_deadline) = patch.next_deadline {
            self.next_deadline = Some(next_deadline);
        }
        self.updated_at = now;
        Ok(())
    }

    pub(in crate::domain) fn set_derived(
        &mut self,
        paid: f64,
        progress: Progress,
        now: DateTime<Utc>,
    ) {
        self.paid = paid.max(0.0);
        self.progress = progress;
        self.updated_at = now;
    }

    /// Sequence the next created milestone will receive
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub(in crate::domain) fn take_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Bump a stale counter so it stays ahead of every stored milestone
    pub(in crate::domain) fn reserve_sequences_after(&mut self, sequence: u64) {
        if self.next_sequence <= sequence {
            self.next_sequence = sequence + 1;
        }
    }
}

/// A contract together with its milestones in creation order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contract {
    #[serde(flatten)]
    record: ContractRecord,
    milestones: Vec<Milestone>,
}

impl Contract {
    /// Assemble the aggregate; milestones are sorted by creation sequence
    pub fn new(mut record: ContractRecord, mut milestones: Vec<Milestone>) -> Self {
        debug_assert!(milestones.iter().all(|m| m.contract_id() == record.id()));
        milestones.sort_by_key(Milestone::sequence);
        if let Some(last) = milestones.last() {
            record.reserve_sequences_after(last.sequence());
        }
        Self { record, milestones }
    }

    pub fn id(&self) -> ContractId {
        self.record.id()
    }

    pub fn record(&self) -> &ContractRecord {
        &self.record
    }

    pub fn paid(&self) -> f64 {
        self.record.paid()
    }

    pub fn progress(&self) -> Progress {
        self.record.progress()
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn milestone(&self, id: MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id() == id)
    }

    /// The milestone currently `IN_PROGRESS`, if any
    pub fn active_milestone(&self) -> Option<&Milestone> {
        self.milestones
            .iter()
            .find(|m| m.status() == MilestoneStatus::InProgress)
    }

    /// Milestones whose status is not `CANCELLED`
    pub fn active_count(&self) -> usize {
        self.milestones
            .iter()
            .filter(|m| m.status().is_active())
            .count()
    }

    pub fn into_parts(self) -> (ContractRecord, Vec<Milestone>) {
        (self.record, self.milestones)
    }

    pub(in crate::domain) fn record_mut(&mut self) -> &mut ContractRecord {
        &mut self.record
    }

    pub(in crate::domain) fn milestones_mut(&mut self) -> &mut Vec<Milestone> {
        &mut self.milestones
    }
}
