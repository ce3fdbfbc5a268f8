//! Contract Mutator
//!
//! Serializes milestone mutations per contract and commits each one as a
//! single change set:
//! - Acquire the contract lock and the store lease (bounded wait)
//! - Load the contract with all of its milestones
//! - Apply the milestone lifecycle
//! - Commit the change set and re-read the contract

mod locks;
mod operation;
mod use_case;

pub use locks::{ContractGuard, ContractLocks, LockGuard, DEFAULT_LOCK_TIMEOUT};
pub use operation::{MilestoneOperation, MutationOutcome};
pub use use_case::ContractMutator;
pub(crate) use use_case::{load_contract, resolve_reference};
