//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod contract_kind;
mod contract_status;
mod ids;
mod milestone_status;
mod progress;

pub use contract_kind::ContractKind;
pub use contract_status::ContractStatus;
pub use ids::{ContractId, MilestoneId};
pub use milestone_status::MilestoneStatus;
pub use progress::Progress;
