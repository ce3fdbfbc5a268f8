//! Contract Mutator
//!
//! Runs every milestone mutation as lock, load, apply, commit, reload. The
//! lock is the in-process table entry plus the gateway's contract lease.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::entities::{Contract, Milestone, MilestoneDraft, MilestonePatch};
use crate::domain::ports::{ChangeSet, StorageGateway};
use crate::domain::services::{LifecycleError, MilestoneLifecycle, Transition};
use crate::domain::value_objects::{ContractId, MilestoneId, MilestoneStatus};
use crate::error::{PactError, PactResult};

use super::locks::ContractLocks;
use super::operation::{MilestoneOperation, MutationOutcome};

/// Applies milestone mutations atomically per contract
pub struct ContractMutator<G>
where
    G: StorageGateway + ?Sized,
{
    gateway: Arc<G>,
    locks: Arc<ContractLocks>,
}

impl<G> Clone for ContractMutator<G>
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

impl<G> ContractMutator<G>
where
    G: StorageGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>, locks: Arc<ContractLocks>) -> Self {
        Self { gateway, locks }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Apply one operation to a contract and commit the result
    pub fn apply(
        &self,
        contract_id: ContractId,
        operation: MilestoneOperation,
    ) -> PactResult<MutationOutcome> {
        let _guard = self.locks.acquire_in(&*self.gateway, contract_id)?;

        let mut contract = load_contract(&*self.gateway, contract_id)?;
        if let Some(target) = operation.target() {
            resolve_reference(&*self.gateway, &contract, target)?;
        }

        let kind = operation.name();
        let writes_contract = operation.writes_contract();
        let transition = self.run(&mut contract, operation)?;

        let changes = change_set(&contract, &transition, writes_contract);
        self.gateway.commit(&changes).map_err(|err| {
            warn!(contract = %contract_id, operation = kind, error = %err, "commit failed");
            PactError::from(err).on_contract(contract_id)
        })?;
        debug!(
            contract = %contract_id,
            writes = changes.len(),
            "committed change set"
        );

        let contract = load_contract(&*self.gateway, contract_id)?;
        info!(
            contract = %contract_id,
            milestone = %transition.milestone,
            operation = kind,
            paid = contract.paid(),
            progress = contract.progress().value(),
            "milestone mutation applied"
        );
        Ok(MutationOutcome {
            contract,
            transition,
        })
    }

    pub fn add_milestone(
        &self,
        contract_id: ContractId,
        draft: MilestoneDraft,
    ) -> PactResult<Contract> {
        self.apply(contract_id, MilestoneOperation::Add(draft))
            .map(|outcome| outcome.contract)
    }

    pub fn change_milestone_status(
        &self,
        contract_id: ContractId,
        milestone: MilestoneId,
        status: MilestoneStatus,
    ) -> PactResult<Contract> {
        self.apply(
            contract_id,
            MilestoneOperation::ChangeStatus { milestone, status },
        )
        .map(|outcome| outcome.contract)
    }

    /// Edit informational fields and return the updated milestone
    pub fn edit_milestone(
        &self,
        contract_id: ContractId,
        milestone: MilestoneId,
        patch: MilestonePatch,
    ) -> PactResult<Milestone> {
        let outcome = self.apply(contract_id, MilestoneOperation::Edit { milestone, patch })?;
        outcome.milestone().cloned().ok_or_else(|| {
            PactError::from(LifecycleError::MilestoneNotFound {
                contract: contract_id,
                milestone,
            })
        })
    }

    pub fn delete_milestone(
        &self,
        contract_id: ContractId,
        milestone: MilestoneId,
    ) -> PactResult<Contract> {
        self.apply(contract_id, MilestoneOperation::Delete { milestone })
            .map(|outcome| outcome.contract)
    }

    fn run(
        &self,
        contract: &mut Contract,
        operation: MilestoneOperation,
    ) -> PactResult<Transition> {
        let now = Utc::now();
        let transition = match operation {
            MilestoneOperation::Add(draft) => {
                // Rejected drafts must not consume an id
                draft.validate().map_err(LifecycleError::from)?;
                let id = self
                    .gateway
                    .next_milestone_id()
                    .map_err(|err| PactError::from(err).on_contract(contract.id()))?;
                MilestoneLifecycle::create(contract, id, draft, now)?
            }
            MilestoneOperation::ChangeStatus { milestone, status } => {
                MilestoneLifecycle::change_status(contract, milestone, status, now)?
            }
            MilestoneOperation::Edit { milestone, patch } => {
                MilestoneLifecycle::edit(contract, milestone, patch, now)?
            }
            MilestoneOperation::Delete { milestone } => {
                MilestoneLifecycle::delete(contract, milestone, now)?
            }
        };
        Ok(transition)
    }
}

/// Load a contract with its full milestone set
pub(crate) fn load_contract<G>(gateway: &G, id: ContractId) -> PactResult<Contract>
where
    G: StorageGateway + ?Sized,
{
    let storage = |err| PactError::from(err).on_contract(id);
    let record = gateway
        .get_contract(id)
        .map_err(storage)?
        .ok_or(PactError::ContractNotFound(id))?;
    let milestones = gateway.get_milestones(id).map_err(storage)?;
    Ok(Contract::new(record, milestones))
}

/// A milestone id that is not part of `contract` is either unknown or
/// belongs to another contract
pub(crate) fn resolve_reference<G>(
    gateway: &G,
    contract: &Contract,
    milestone: MilestoneId,
) -> PactResult<()>
where
    G: StorageGateway + ?Sized,
{
    if contract.milestone(milestone).is_some() {
        return Ok(());
    }
    let stored = gateway
        .get_milestone(milestone)
        .map_err(|err| PactError::from(err).on_contract(contract.id()))?;
    let err = match stored {
        Some(other) if other.contract_id() != contract.id() => {
            LifecycleError::InvalidContractReference {
                contract: contract.id(),
                milestone,
                owner: other.contract_id(),
            }
        }
        _ => LifecycleError::MilestoneNotFound {
            contract: contract.id(),
            milestone,
        },
    };
    Err(err.into())
}

fn change_set(contract: &Contract, transition: &Transition, writes_contract: bool) -> ChangeSet {
    ChangeSet {
        contract: writes_contract.then(|| contract.record().clone()),
        upserts: transition
            .written
            .iter()
            .filter_map(|id| contract.milestone(*id).cloned())
            .collect(),
        deletes: transition.removed.into_iter().collect(),
    }
}
