//! In-memory storage gateway
//!
//! Used by tests and `--store memory`. A change set is applied under one
//! write guard, so readers never observe half a commit.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::entities::{ContractRecord, Milestone};
use crate::domain::ports::{ChangeSet, StorageError, StorageGateway, StorageResult};
use crate::domain::value_objects::{ContractId, MilestoneId};

use super::ledger::Ledger;

#[derive(Debug, Default)]
pub struct MemoryGateway {
    ledger: RwLock<Ledger>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Ledger>> {
        self.ledger
            .read()
            .map_err(|_| StorageError::Unavailable("memory ledger lock poisoned".to_string()))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Ledger>> {
        self.ledger
            .write()
            .map_err(|_| StorageError::Unavailable("memory ledger lock poisoned".to_string()))
    }
}

impl StorageGateway for MemoryGateway {
    fn get_contract(&self, id: ContractId) -> StorageResult<Option<ContractRecord>> {
        Ok(self.read()?.contract(id))
    }

    fn get_milestones(&self, contract: ContractId) -> StorageResult<Vec<Milestone>> {
        Ok(self.read()?.milestones_of(contract))
    }

    fn get_milestone(&self, id: MilestoneId) -> StorageResult<Option<Milestone>> {
        Ok(self.read()?.milestone(id))
    }

    fn put_contract(&self, record: &ContractRecord) -> StorageResult<()> {
        self.write()?.put_contract(record.clone());
        Ok(())
    }

    fn put_milestone(&self, milestone: &Milestone) -> StorageResult<()> {
        self.write()?.put_milestone(milestone.clone());
        Ok(())
    }

    fn delete_milestone(&self, id: MilestoneId) -> StorageResult<bool> {
        Ok(self.write()?.remove_milestone(id))
    }

    fn list_contracts(&self) -> StorageResult<Vec<ContractRecord>> {
        Ok(self.read()?.contracts())
    }

    fn delete_contract(&self, id: ContractId) -> StorageResult<bool> {
        Ok(self.write()?.remove_contract(id))
    }

    fn next_contract_id(&self) -> StorageResult<ContractId> {
        Ok(self.write()?.allocate_contract_id())
    }

    fn next_milestone_id(&self) -> StorageResult<MilestoneId> {
        Ok(self.write()?.allocate_milestone_id())
    }

    fn commit(&self, changes: &ChangeSet) -> StorageResult<()> {
        self.write()?.apply(changes);
        Ok(())
    }
}
