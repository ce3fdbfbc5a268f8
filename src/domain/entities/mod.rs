//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `ContractRecord` - A persisted contract row (owns `paid` and `progress`)
//! - `Contract` - The aggregate: a record plus its ordered milestones
//! - `Milestone` - One step of a contract

mod contract;
mod milestone;
mod validation;

pub use contract::{Contract, ContractPatch, ContractRecord, NewContract, Owner};
pub use milestone::{Milestone, MilestoneDraft, MilestonePatch};
pub use validation::{ValidationError, MIN_NAME_LEN};
