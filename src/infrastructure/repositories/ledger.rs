//! In-memory ledger tables shared by the storage backends
//!
//! `Ledger` is the working set; `LedgerFile` is its on-disk TOML shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{ContractRecord, Milestone};
use crate::domain::ports::ChangeSet;
use crate::domain::value_objects::{ContractId, MilestoneId};

/// Current ledger file format version
pub const LEDGER_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Ledger {
    contracts: BTreeMap<ContractId, ContractRecord>,
    milestones: BTreeMap<MilestoneId, Milestone>,
    last_contract_id: u64,
    last_milestone_id: u64,
}

impl Ledger {
    pub fn contract(&self, id: ContractId) -> Option<ContractRecord> {
        self.contracts.get(&id).cloned()
    }

    pub fn contracts(&self) -> Vec<ContractRecord> {
        self.contracts.values().cloned().collect()
    }

    pub fn milestone(&self, id: MilestoneId) -> Option<Milestone> {
        self.milestones.get(&id).cloned()
    }

    pub fn milestones_of(&self, contract: ContractId) -> Vec<Milestone> {
        self.milestones
            .values()
            .filter(|m| m.contract_id() == contract)
            .cloned()
            .collect()
    }

    pub fn put_contract(&mut self, record: ContractRecord) {
        self.last_contract_id = self.last_contract_id.max(record.id().get());
        self.contracts.insert(record.id(), record);
    }

    pub fn put_milestone(&mut self, milestone: Milestone) {
        self.last_milestone_id = self.last_milestone_id.max(milestone.id().get());
        self.milestones.insert(milestone.id(), milestone);
    }

    pub fn remove_milestone(&mut self, id: MilestoneId) -> bool {
        self.milestones.remove(&id).is_some()
    }

    /// Remove a contract and its milestones
    pub fn remove_contract(&mut self, id: ContractId) -> bool {
        self.milestones.retain(|_, m| m.contract_id() != id);
        self.contracts.remove(&id).is_some()
    }

    /// Ids are never reused, even after deletes
    pub fn allocate_contract_id(&mut self) -> ContractId {
        self.last_contract_id += 1;
        ContractId::new(self.last_contract_id)
    }

    pub fn allocate_milestone_id(&mut self) -> MilestoneId {
        self.last_milestone_id += 1;
        MilestoneId::new(self.last_milestone_id)
    }

    /// Apply every write of a change set
    pub fn apply(&mut self, changes: &ChangeSet) {
        for id in &changes.deletes {
            self.remove_milestone(*id);
        }
        for milestone in &changes.upserts {
            self.put_milestone(milestone.clone());
        }
        if let Some(record) = &changes.contract {
            self.put_contract(record.clone());
        }
    }
}

/// TOML representation of the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LedgerFile {
    pub version: u32,
    #[serde(default)]
    pub last_contract_id: u64,
    #[serde(default)]
    pub last_milestone_id: u64,
    #[serde(default)]
    pub contracts: Vec<ContractRecord>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

impl From<&Ledger> for LedgerFile {
    fn from(ledger: &Ledger) -> Self {
        Self {
            version: LEDGER_VERSION,
            last_contract_id: ledger.last_contract_id,
            last_milestone_id: ledger.last_milestone_id,
            contracts: ledger.contracts.values().cloned().collect(),
            milestones: ledger.milestones.values().cloned().collect(),
        }
    }
}

impl From<LedgerFile> for Ledger {
    /// Counters are raised past any stored id so a hand-edited file cannot
    /// cause id reuse
    fn from(file: LedgerFile) -> Self {
        let mut ledger = Ledger {
            last_contract_id: file.last_contract_id,
            last_milestone_id: file.last_milestone_id,
            ..Ledger::default()
        };
        for record in file.contracts {
            ledger.put_contract(record);
        }
        for milestone in file.milestones {
            ledger.put_milestone(milestone);
        }
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewContract, Owner};
    use chrono::Utc;

    fn record(id: u64) -> ContractRecord {
        ContractRecord::create(
            ContractId::new(id),
            NewContract {
                title: format!("Contract {}", id),
                owner: Owner {
                    name: "Grace".to_string(),
                    ..Owner::default()
                },
                total: 10.0,
                ..NewContract::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn allocated_ids_are_not_reused_after_delete() {
        let mut ledger = Ledger::default();
        let first = ledger.allocate_contract_id();
        ledger.put_contract(record(first.get()));
        ledger.remove_contract(first);

        assert_eq!(ledger.allocate_contract_id(), ContractId::new(2));
    }

    #[test]
    fn loading_raises_stale_counters() {
        let file = LedgerFile {
            version: LEDGER_VERSION,
            last_contract_id: 0,
            last_milestone_id: 0,
            contracts: vec![record(5)],
            milestones: Vec::new(),
        };

        let mut ledger = Ledger::from(file);

        assert_eq!(ledger.allocate_contract_id(), ContractId::new(6));
    }
}
