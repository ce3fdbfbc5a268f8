//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod storage_gateway;

pub use storage_gateway::{
    ChangeSet, ContractLease, StorageError, StorageGateway, StorageResult,
};
