//! Contract Service
//!
//! Create, read, list, update and delete contracts, plus milestone reads.
//! Milestone writes go through the mutator.

mod query;
mod use_case;

pub use query::{ContractQuery, SortField, SortOrder, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use use_case::ContractService;
