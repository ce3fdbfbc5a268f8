//! Storage gateway implementations

mod ledger;
pub mod memory;
pub mod toml_ledger;

pub use ledger::LEDGER_VERSION;
pub use memory::MemoryGateway;
pub use toml_ledger::TomlLedgerGateway;
