//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::sync::Arc;

use tracing::debug;

use crate::application::{ContractLocks, ContractMutator, ContractService};
use crate::config::{Config, StorageBackend};
use crate::domain::ports::StorageGateway;
use crate::infrastructure::{MemoryGateway, TomlLedgerGateway};

/// Contract service bound to the configured backend
pub type ConcreteContractService = ContractService<dyn StorageGateway>;

/// Mutator bound to the configured backend
pub type ConcreteContractMutator = ContractMutator<dyn StorageGateway>;

/// Use cases sharing one gateway and one lock table
pub struct Services {
    pub contracts: ConcreteContractService,
    pub mutator: ConcreteContractMutator,
}

/// Build the storage gateway selected by the config
pub fn create_gateway(config: &Config) -> Arc<dyn StorageGateway> {
    match config.storage.backend {
        StorageBackend::Memory => {
            debug!("using in-memory storage");
            Arc::new(MemoryGateway::new())
        }
        StorageBackend::Toml => {
            let path = config.storage.ledger_path();
            debug!(path = %path.display(), "using TOML ledger");
            Arc::new(TomlLedgerGateway::new(path))
        }
    }
}

/// Create both use cases with all dependencies wired up
pub fn create_services(config: &Config) -> Services {
    create_services_with_gateway(create_gateway(config), config)
}

/// Create both use cases over an existing gateway
pub fn create_services_with_gateway(gateway: Arc<dyn StorageGateway>, config: &Config) -> Services {
    let locks = Arc::new(ContractLocks::new(config.locking.timeout()));
    Services {
        contracts: ContractService::new(Arc::clone(&gateway), Arc::clone(&locks)),
        mutator: ContractMutator::new(gateway, locks),
    }
}
