//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates locking and persistence around domain operations
//!
//! ## Use Cases
//!
//! - `ContractMutator` - Milestone add / status change / edit / delete
//! - `ContractService` - Contract CRUD and milestone reads

pub mod contracts;
pub mod mutator;

pub use contracts::{ContractQuery, ContractService, SortField, SortOrder};
pub use mutator::{
    ContractGuard, ContractLocks, ContractMutator, LockGuard, MilestoneOperation,
    MutationOutcome, DEFAULT_LOCK_TIMEOUT,
};
