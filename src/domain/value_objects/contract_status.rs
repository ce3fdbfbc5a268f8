//! Contract status value object
//!
//! Set by clients and never derived from milestone statuses.

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    #[default]
    Pending,
    #[value(alias = "in_progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Pending => "PENDING",
            ContractStatus::InProgress => "IN_PROGRESS",
            ContractStatus::Completed => "COMPLETED",
            ContractStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
