//! Scenario: Freelancer tracks a fixed-price contract
//!
//! Journey: A freelancer signs a contract, splits it into milestones and
//! works through them, dropping one along the way.
//!
//! Steps:
//! 1. Create the contract
//! 2. Add three milestones; the first starts immediately
//! 3. Complete the first; the second is promoted
//! 4. Cancel the second; the third is promoted
//! 5. Complete the third
//! 6. Reopen the ledger in a fresh process and read the final state
//!
//! Success Criteria:
//! - `paid` is the sum of completed amounts at every step
//! - `progress` counts only non-cancelled milestones

use crate::common::*;

fn statuses(contract: &serde_json::Value) -> Vec<String> {
    contract["milestones"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["status"].as_str().unwrap().to_string())
        .collect()
}

/// SCENARIO: contract from signature to final milestone
#[test]
fn scenario_freelancer_completes_contract() {
    let env = TestEnv::new();

    // Step 1
    let id = env.create_contract("Shop redesign", "3000");
    let id_arg = id.to_string();

    // Step 2
    let design = env.add_milestone(id, "Design", "1000").to_string();
    let build = env.add_milestone(id, "Build", "1500").to_string();
    let launch = env.add_milestone(id, "Launch", "500").to_string();

    let contract = env.run_json(&["contract", "show", &id_arg]);
    assert_eq!(statuses(&contract), ["IN_PROGRESS", "PENDING", "PENDING"]);
    assert_eq!(contract["progress"], 0.0);

    // Step 3
    let contract = env.run_json(&["milestone", "status", &id_arg, &design, "completed"]);
    assert_eq!(statuses(&contract), ["COMPLETED", "IN_PROGRESS", "PENDING"]);
    assert_eq!(contract["paid"], 1000.0);
    assert_eq!(contract["progress_rounded"], 33);

    // Step 4
    let contract = env.run_json(&["milestone", "status", &id_arg, &build, "cancelled"]);
    assert_eq!(statuses(&contract), ["COMPLETED", "CANCELLED", "IN_PROGRESS"]);
    assert_eq!(contract["paid"], 1000.0);
    assert_eq!(contract["progress"], 50.0);

    // Step 5
    let contract = env.run_json(&["milestone", "status", &id_arg, &launch, "completed"]);
    assert_eq!(statuses(&contract), ["COMPLETED", "CANCELLED", "COMPLETED"]);
    assert_eq!(contract["paid"], 1500.0);
    assert_eq!(contract["progress"], 100.0);

    // Step 6
    let result = env.run(&["contract", "show", &id_arg]);
    assert_success!(result);
    assert_output_contains!(result, "Paid: 1500.00");
    assert_output_contains!(result, "Progress: 100%");

    // Finished milestones stay finished
    let result = env.run(&["milestone", "status", &id_arg, &design, "in-progress"]);
    assert_exit_code!(result, 2);
    assert_output_contains!(result, "status is final");
}

/// SCENARIO: a milestone is added after everything was cancelled
#[test]
fn scenario_restart_after_cancelling_everything() {
    let env = TestEnv::new();
    let id = env.create_contract("Abandoned plan", "400");
    let id_arg = id.to_string();
    let first = env.add_milestone(id, "Research", "200").to_string();

    let contract = env.run_json(&["milestone", "status", &id_arg, &first, "cancelled"]);
    assert_eq!(statuses(&contract), ["CANCELLED"]);
    assert_eq!(contract["progress"], 0.0);

    let contract = env.run_json(&[
        "milestone", "add", &id_arg, "--title", "New research", "--amount", "200",
    ]);
    assert_eq!(statuses(&contract), ["CANCELLED", "IN_PROGRESS"]);
}
