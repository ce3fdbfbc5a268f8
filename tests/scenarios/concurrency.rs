//! Scenario: Several workers mutate the same contracts at once
//!
//! Journey: An integration pushes milestone updates from many threads, and
//! several shell scripts run `pactline` against one ledger file at the same
//! time. Every mutation of one contract is serialized, inside a process by
//! the lock table and across processes by the ledger's contract lease, so no
//! update is lost and the aggregate stays consistent.
//!
//! Success Criteria:
//! - Exactly one milestone in progress while work remains
//! - Final `paid` equals the sum of all amounts
//! - Sequences are unique and gap free

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pactline::application::{ContractLocks, ContractMutator, ContractService};
use pactline::domain::ports::StorageGateway;
use pactline::{
    ContractId, ErrorClass, MemoryGateway, MilestoneDraft, MilestoneStatus, NewContract, Owner,
    TomlLedgerGateway,
};
use tempfile::tempdir;

use crate::common::TestEnv;

const WORKERS: usize = 6;
const PER_WORKER: usize = 4;

fn services<G>(gateway: Arc<G>) -> (ContractService<G>, ContractMutator<G>)
where
    G: StorageGateway + ?Sized,
{
    let locks = Arc::new(ContractLocks::new(Duration::from_secs(30)));
    (
        ContractService::new(Arc::clone(&gateway), Arc::clone(&locks)),
        ContractMutator::new(gateway, locks),
    )
}

fn new_contract(title: &str) -> NewContract {
    NewContract {
        title: title.to_string(),
        owner: Owner {
            name: "Margaret".to_string(),
            ..Owner::default()
        },
        total: 100_000.0,
        ..NewContract::default()
    }
}

fn run_workers<G>(contracts: &ContractService<G>, mutator: &ContractMutator<G>, ids: &[ContractId])
where
    G: StorageGateway + ?Sized,
{
    // Add from every worker at once
    thread::scope(|scope| {
        for worker in 0..WORKERS {
            scope.spawn(move || {
                for step in 0..PER_WORKER {
                    let id = ids[(worker + step) % ids.len()];
                    mutator
                        .add_milestone(
                            id,
                            MilestoneDraft::new(format!("Worker {worker} step {step}"))
                                .with_amount(10.0),
                        )
                        .unwrap();
                }
            });
        }
    });

    // Race to complete whatever is active until nothing is left
    thread::scope(|scope| {
        for _ in 0..WORKERS {
            scope.spawn(move || {
                for &id in ids {
                    loop {
                        let contract = contracts.get(id).unwrap();
                        let Some(active) = contract.active_milestone() else {
                            break;
                        };
                        match mutator.change_milestone_status(
                            id,
                            active.id(),
                            MilestoneStatus::Completed,
                        ) {
                            Ok(_) => {}
                            // Another worker finished it first
                            Err(err) if err.class() == ErrorClass::InvalidTransition => {}
                            Err(err) => panic!("unexpected error: {err}"),
                        }
                    }
                }
            });
        }
    });
}

fn assert_settled<G>(contracts: &ContractService<G>, ids: &[ContractId])
where
    G: StorageGateway + ?Sized,
{
    let mut total_milestones = 0;
    for &id in ids {
        let contract = contracts.get(id).unwrap();
        let milestones = contract.milestones();
        total_milestones += milestones.len();

        assert!(milestones
            .iter()
            .all(|m| m.status() == MilestoneStatus::Completed));
        assert_eq!(contract.paid(), 10.0 * milestones.len() as f64);
        assert_eq!(contract.progress().rounded(), 100);

        let sequences: Vec<u64> = milestones.iter().map(|m| m.sequence()).collect();
        let expected: Vec<u64> = (1..=milestones.len() as u64).collect();
        assert_eq!(sequences, expected);
    }
    assert_eq!(total_milestones, WORKERS * PER_WORKER);
}

/// SCENARIO: concurrent workers over the in-memory backend
#[test]
fn scenario_concurrent_workers_memory() {
    let (contracts, mutator) = services(Arc::new(MemoryGateway::new()));
    let ids: Vec<ContractId> = ["North wing", "South wing"]
        .iter()
        .map(|title| contracts.create(new_contract(title)).unwrap().id())
        .collect();

    run_workers(&contracts, &mutator, &ids);
    assert_settled(&contracts, &ids);
}

/// SCENARIO: concurrent workers over the TOML ledger
#[test]
fn scenario_concurrent_workers_toml_ledger() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.toml");
    let (contracts, mutator) = services(Arc::new(TomlLedgerGateway::new(&path)));
    let ids: Vec<ContractId> = ["East wing", "West wing"]
        .iter()
        .map(|title| contracts.create(new_contract(title)).unwrap().id())
        .collect();

    run_workers(&contracts, &mutator, &ids);
    assert_settled(&contracts, &ids);

    // A second gateway over the same file sees the same state
    let (reopened, _) = services(Arc::new(TomlLedgerGateway::new(&path)));
    assert_settled(&reopened, &ids);
}

/// SCENARIO: separate pactline processes add to one contract at once
#[test]
fn scenario_concurrent_cli_processes() {
    const PROCESSES: usize = 6;
    let env = TestEnv::new();
    let id = env.create_contract("Harbour dredging", "6000").to_string();

    let titles: Vec<String> = (0..PROCESSES).map(|i| format!("Section {i}")).collect();
    let children: Vec<_> = titles
        .iter()
        .map(|title| {
            env.spawn(&[
                "--lock-timeout-ms",
                "30000",
                "milestone",
                "add",
                &id,
                "--title",
                title,
                "--amount",
                "1000",
            ])
        })
        .collect();
    for child in children {
        let result = TestEnv::wait(child);
        assert!(
            result.success,
            "concurrent add failed with {}:\n{}",
            result.exit_code,
            result.combined_output()
        );
    }

    let milestones = env.run_json(&["milestone", "list", &id]);
    let milestones = milestones.as_array().unwrap();
    assert_eq!(milestones.len(), PROCESSES);

    let in_progress = milestones
        .iter()
        .filter(|m| m["status"] == "IN_PROGRESS")
        .count();
    assert_eq!(in_progress, 1);

    let mut sequences: Vec<u64> = milestones
        .iter()
        .map(|m| m["sequence"].as_u64().unwrap())
        .collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=PROCESSES as u64).collect::<Vec<u64>>());

    let mut ids: Vec<u64> = milestones.iter().map(|m| m["id"].as_u64().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), PROCESSES);

    let contract = env.run_json(&["contract", "show", &id]);
    assert_eq!(contract["paid"], 0.0);
    assert_eq!(contract["milestones"].as_array().unwrap().len(), PROCESSES);
}
