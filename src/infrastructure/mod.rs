//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `repositories/` - Storage gateways (in-memory, TOML ledger file)

pub mod repositories;

// Re-export for convenience
pub use repositories::{MemoryGateway, TomlLedgerGateway};
