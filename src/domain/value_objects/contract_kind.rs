//! Contract kind value object

use serde::{Deserialize, Serialize};

/// Billing model of a contract
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractKind {
    /// Fixed price
    #[default]
    Fixed,
    /// Billed by the hour
    Hourly,
}

impl std::fmt::Display for ContractKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractKind::Fixed => write!(f, "FIXED"),
            ContractKind::Hourly => write!(f, "HOURLY"),
        }
    }
}
