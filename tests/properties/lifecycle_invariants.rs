//! Property tests for the milestone lifecycle, driven through the mutator.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use pactline::application::{ContractLocks, ContractMutator, ContractService};
use pactline::{
    Contract, ContractId, MemoryGateway, Milestone, MilestoneDraft, MilestoneId,
    MilestonePatch, MilestoneStatus, NewContract, Owner,
};

#[derive(Debug, Clone)]
enum Op {
    Add(u32),
    Status(usize, MilestoneStatus),
    Edit(usize, u32),
    Delete(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..1_000).prop_map(Op::Add),
        (0usize..8, prop::sample::select(MilestoneStatus::ALL.to_vec()))
            .prop_map(|(index, status)| Op::Status(index, status)),
        (0usize..8, 0u32..1_000).prop_map(|(index, amount)| Op::Edit(index, amount)),
        (0usize..8).prop_map(Op::Delete),
    ]
}

struct Harness {
    contracts: ContractService<MemoryGateway>,
    mutator: ContractMutator<MemoryGateway>,
    id: ContractId,
}

impl Harness {
    fn new() -> Self {
        let gateway = Arc::new(MemoryGateway::new());
        let locks = Arc::new(ContractLocks::new(Duration::from_secs(5)));
        let contracts = ContractService::new(Arc::clone(&gateway), Arc::clone(&locks));
        let mutator = ContractMutator::new(gateway, locks);
        let id = contracts
            .create(NewContract {
                title: "Property contract".to_string(),
                owner: Owner {
                    name: "Barbara".to_string(),
                    ..Owner::default()
                },
                total: 10_000.0,
                ..NewContract::default()
            })
            .unwrap()
            .id();
        Self {
            contracts,
            mutator,
            id,
        }
    }

    /// Pick an existing milestone, or an id nothing uses
    fn target(&self, contract: &Contract, index: usize) -> MilestoneId {
        let milestones = contract.milestones();
        if milestones.is_empty() {
            MilestoneId::new(9_999)
        } else {
            milestones[index % milestones.len()].id()
        }
    }

    fn run(&self, op: &Op) -> bool {
        let before = self.contracts.get(self.id).unwrap();
        let result = match *op {
            Op::Add(amount) => self.mutator.add_milestone(
                self.id,
                MilestoneDraft::new("Generated").with_amount(f64::from(amount)),
            ),
            Op::Status(index, status) => {
                let target = self.target(&before, index);
                self.mutator.change_milestone_status(self.id, target, status)
            }
            Op::Edit(index, amount) => {
                let target = self.target(&before, index);
                let patch = MilestonePatch {
                    amount: Some(f64::from(amount)),
                    ..MilestonePatch::default()
                };
                return self.mutator.edit_milestone(self.id, target, patch).is_ok();
            }
            Op::Delete(index) => {
                let target = self.target(&before, index);
                self.mutator.delete_milestone(self.id, target)
            }
        };
        result.is_ok()
    }
}

/// Completed over non-cancelled, as a percentage
fn expected_progress(milestones: &[Milestone]) -> f64 {
    let active = milestones
        .iter()
        .filter(|m| m.status() != MilestoneStatus::Cancelled)
        .count();
    let completed = milestones
        .iter()
        .filter(|m| m.status() == MilestoneStatus::Completed)
        .count();
    if active == 0 {
        0.0
    } else {
        100.0 * completed as f64 / active as f64
    }
}

/// `paid_matches_amounts` only holds while no completed amount was edited
fn check_invariants(contract: &Contract, paid_matches_amounts: bool) -> Result<(), TestCaseError> {
    let milestones = contract.milestones();

    let in_progress = milestones
        .iter()
        .filter(|m| m.status() == MilestoneStatus::InProgress)
        .count();
    prop_assert!(in_progress <= 1, "{in_progress} milestones in progress");

    if let Some(active) = milestones
        .iter()
        .position(|m| m.status() == MilestoneStatus::InProgress)
    {
        prop_assert!(
            milestones[..active]
                .iter()
                .all(|m| m.status() != MilestoneStatus::Pending),
            "a pending milestone precedes the active one"
        );
    }

    prop_assert!(contract.paid() >= 0.0);
    let progress = contract.progress().value();
    prop_assert!((0.0..=100.0).contains(&progress));

    if !paid_matches_amounts {
        return check_progress_and_order(contract);
    }
    let completed_amount: f64 = milestones
        .iter()
        .filter(|m| m.status() == MilestoneStatus::Completed)
        .map(|m| m.amount())
        .sum();
    prop_assert!(
        (contract.paid() - completed_amount).abs() < 1e-6,
        "paid {} != completed amount {}",
        contract.paid(),
        completed_amount
    );
    check_progress_and_order(contract)
}

fn check_progress_and_order(contract: &Contract) -> Result<(), TestCaseError> {
    let milestones = contract.milestones();
    let expected = expected_progress(milestones);
    prop_assert!((contract.progress().value() - expected).abs() < 1e-9);

    let sequences: Vec<u64> = milestones.iter().map(|m| m.sequence()).collect();
    prop_assert!(sequences.windows(2).all(|pair| pair[0] < pair[1]));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: any operation sequence keeps the aggregate consistent.
    #[test]
    fn property_operations_keep_aggregate_consistent(ops in proptest::collection::vec(op(), 1..40)) {
        let harness = Harness::new();
        let mut edited = false;
        for op in &ops {
            edited |= harness.run(op) && matches!(op, Op::Edit(..));
            let contract = harness.contracts.get(harness.id).unwrap();
            check_invariants(&contract, !edited)?;
        }
    }

    /// PROPERTY: a refused operation leaves the stored contract untouched.
    #[test]
    fn property_failed_operations_have_no_effect(ops in proptest::collection::vec(op(), 1..40)) {
        let harness = Harness::new();
        for op in &ops {
            let before = harness.contracts.get(harness.id).unwrap();
            if !harness.run(op) {
                let after = harness.contracts.get(harness.id).unwrap();
                prop_assert_eq!(before, after);
            }
        }
    }
}
