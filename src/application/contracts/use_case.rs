//! Contract Service
//!
//! Contract CRUD. Shares the gateway and lock table with `ContractMutator`,
//! so contract updates and deletes never interleave with milestone
//! mutations of the same contract, in this process or another one.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::application::mutator::{load_contract, resolve_reference, ContractLocks};
use crate::domain::entities::{Contract, ContractPatch, ContractRecord, Milestone, NewContract};
use crate::domain::ports::StorageGateway;
use crate::domain::services::LifecycleError;
use crate::domain::value_objects::{ContractId, MilestoneId};
use crate::error::{PactError, PactResult};

use super::query::ContractQuery;

pub struct ContractService<G>
where
    G: StorageGateway + ?Sized,
{
    gateway: Arc<G>,
    locks: Arc<ContractLocks>,
}

impl<G> Clone for ContractService<G>
where
    G: StorageGateway + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<G> ContractService<G>
where
    G: StorageGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>, locks: Arc<ContractLocks>) -> Self {
        Self { gateway, locks }
    }

    /// Create a contract with `paid` and `progress` at zero
    pub fn create(&self, input: NewContract) -> PactResult<Contract> {
        input.validate()?;
        let now = Utc::now();
        let id = self.gateway.next_contract_id()?;
        let record = ContractRecord::create(id, input, now)?;
        self.gateway
            .put_contract(&record)
            .map_err(|err| PactError::from(err).on_contract(id))?;

        info!(contract = %id, title = record.title(), "contract created");
        Ok(Contract::new(record, Vec::new()))
    }

    pub fn get(&self, id: ContractId) -> PactResult<Contract> {
        load_contract(&*self.gateway, id)
    }

    pub fn list(&self, query: &ContractQuery) -> PactResult<Vec<ContractRecord>> {
        query.validate()?;
        let records = self.gateway.list_contracts()?;
        Ok(query.apply(records))
    }

    /// Apply client edits; derived fields are never touched
    pub fn update(&self, id: ContractId, patch: ContractPatch) -> PactResult<Contract> {
        let _guard = self.locks.acquire_in(&*self.gateway, id)?;

        let contract = load_contract(&*self.gateway, id)?;
        let (mut record, milestones) = contract.into_parts();
        record.apply_patch(patch, Utc::now())?;
        self.gateway
            .put_contract(&record)
            .map_err(|err| PactError::from(err).on_contract(id))?;

        info!(contract = %id, "contract updated");
        Ok(Contract::new(record, milestones))
    }

    /// Remove a contract together with its milestones
    pub fn delete(&self, id: ContractId) -> PactResult<()> {
        let _guard = self.locks.acquire_in(&*self.gateway, id)?;

        let existed = self
            .gateway
            .delete_contract(id)
            .map_err(|err| PactError::from(err).on_contract(id))?;
        if !existed {
            return Err(PactError::ContractNotFound(id));
        }

        info!(contract = %id, "contract deleted");
        Ok(())
    }

    /// Milestones of a contract in creation order
    pub fn milestones(&self, id: ContractId) -> PactResult<Vec<Milestone>> {
        let (_, milestones) = load_contract(&*self.gateway, id)?.into_parts();
        Ok(milestones)
    }

    pub fn milestone(&self, id: ContractId, milestone: MilestoneId) -> PactResult<Milestone> {
        let contract = load_contract(&*self.gateway, id)?;
        resolve_reference(&*self.gateway, &contract, milestone)?;
        contract.milestone(milestone).cloned().ok_or_else(|| {
            LifecycleError::MilestoneNotFound {
                contract: id,
                milestone,
            }
            .into()
        })
    }
}
