//! Pactline - contract and milestone ledger
//!
//! Pactline tracks contracts and the milestones that make them up. A
//! contract's `paid` total, its completion `progress` and which milestone is
//! in progress are all derived from its milestone set, and every milestone
//! mutation recomputes them under a per-contract lock before one commit.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;
pub mod telemetry;

// Re-exports for convenience
pub use application::{ContractMutator, ContractQuery, ContractService, MilestoneOperation};
pub use config::Config;
pub use domain::entities::{
    Contract, ContractPatch, ContractRecord, Milestone, MilestoneDraft, MilestonePatch,
    NewContract, Owner,
};
pub use domain::value_objects::{
    ContractId, ContractKind, ContractStatus, MilestoneId, MilestoneStatus, Progress,
};
pub use error::{ErrorClass, PactError, PactResult};
pub use infrastructure::{MemoryGateway, TomlLedgerGateway};
