//! StorageGateway port - persistence of contracts and milestones
//!
//! The gateway is a record store. Mutations of one contract are serialized
//! by the application layer, which holds its in-process lock table entry and
//! the gateway's [`ContractLease`] around every read-modify-write. Backends
//! shared between processes make the lease exclude other processes.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::entities::{ContractRecord, Milestone};
use crate::domain::value_objects::{ContractId, MilestoneId};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger {path} is corrupted: {message}")]
    Corrupted { path: PathBuf, message: String },

    #[error("failed to serialize ledger: {0}")]
    Serialization(String),

    #[error("unsupported ledger version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    /// A commit failed after some of its writes were already stored
    #[error("commit partially applied ({applied} writes stored): {message}")]
    PartialWrite { applied: usize, message: String },

    /// The backend cannot serve requests (e.g. a poisoned lock)
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Another process held the contract's lease for the whole wait
    #[error("contract {contract} is locked by another process (waited {waited_ms} ms)")]
    LockTimeout { contract: ContractId, waited_ms: u64 },
}

/// Store-level exclusion on one contract, released when dropped
pub struct ContractLease {
    held: Option<Box<dyn Send>>,
}

impl ContractLease {
    /// No store-level lock; the in-process lock table is enough
    pub fn local() -> Self {
        Self { held: None }
    }

    /// Keep `guard` alive for as long as the lease
    pub fn hold(guard: impl Send + 'static) -> Self {
        Self {
            held: Some(Box::new(guard)),
        }
    }

    pub fn is_local(&self) -> bool {
        self.held.is_none()
    }
}

impl fmt::Debug for ContractLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractLease")
            .field("local", &self.is_local())
            .finish()
    }
}

/// Writes produced by one mutation, committed as a unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    /// Contract record to store, if the mutation changed it
    pub contract: Option<ContractRecord>,
    /// Milestones to insert or replace
    pub upserts: Vec<Milestone>,
    /// Milestones to remove
    pub deletes: Vec<MilestoneId>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.contract.is_none() && self.upserts.is_empty() && self.deletes.is_empty()
    }

    /// Number of individual writes in the set
    pub fn len(&self) -> usize {
        usize::from(self.contract.is_some()) + self.upserts.len() + self.deletes.len()
    }
}

/// Abstract store for contracts and milestones
///
/// Implemented by the infrastructure layer (`MemoryGateway`,
/// `TomlLedgerGateway`).
pub trait StorageGateway: Send + Sync {
    fn get_contract(&self, id: ContractId) -> StorageResult<Option<ContractRecord>>;

    /// All milestones of a contract, in no particular order
    fn get_milestones(&self, contract: ContractId) -> StorageResult<Vec<Milestone>>;

    /// Look a milestone up by id regardless of its contract
    fn get_milestone(&self, id: MilestoneId) -> StorageResult<Option<Milestone>>;

    fn put_contract(&self, record: &ContractRecord) -> StorageResult<()>;

    fn put_milestone(&self, milestone: &Milestone) -> StorageResult<()>;

    /// Returns whether the milestone existed
    fn delete_milestone(&self, id: MilestoneId) -> StorageResult<bool>;

    fn list_contracts(&self) -> StorageResult<Vec<ContractRecord>>;

    /// Remove a contract and all of its milestones. Returns whether it existed.
    fn delete_contract(&self, id: ContractId) -> StorageResult<bool>;

    fn next_contract_id(&self) -> StorageResult<ContractId>;

    fn next_milestone_id(&self) -> StorageResult<MilestoneId>;

    /// Exclude other processes from mutating `contract` until the lease drops
    ///
    /// Waits at most `timeout` and then fails with
    /// [`StorageError::LockTimeout`]. The default is for backends that live
    /// inside a single process.
    fn lock_contract(
        &self,
        _contract: ContractId,
        _timeout: Duration,
    ) -> StorageResult<ContractLease> {
        Ok(ContractLease::local())
    }

    /// Store a change set
    ///
    /// The default applies the writes one at a time (deletes, milestone
    /// upserts, then the contract) and is not atomic: a failure after the
    /// first successful write is reported as [`StorageError::PartialWrite`].
    fn commit(&self, changes: &ChangeSet) -> StorageResult<()> {
        let mut applied = 0;
        let partial = |applied: usize, err: StorageError| {
            if applied == 0 {
                err
            } else {
                StorageError::PartialWrite {
                    applied,
                    message: err.to_string(),
                }
            }
        };

        for id in &changes.deletes {
            self.delete_milestone(*id).map_err(|e| partial(applied, e))?;
            applied += 1;
        }
        for milestone in &changes.upserts {
            self.put_milestone(milestone).map_err(|e| partial(applied, e))?;
            applied += 1;
        }
        if let Some(record) = &changes.contract {
            self.put_contract(record).map_err(|e| partial(applied, e))?;
        }
        Ok(())
    }
}
