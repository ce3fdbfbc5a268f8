//! Milestone command handlers
//!
//! Mutations print the whole contract afterwards so the recomputed `paid`
//! and `progress` are visible. `edit` prints only the milestone.

use anyhow::Result;

use pactline::domain::entities::{MilestoneDraft, MilestonePatch};
use pactline::presentation::cli::MilestoneCommand;

use super::CommandContext;

pub fn run(ctx: &CommandContext, command: MilestoneCommand) -> Result<()> {
    let mutator = &ctx.services.mutator;
    match command {
        MilestoneCommand::Add {
            contract,
            title,
            description,
            amount,
            due_date,
        } => {
            let mut draft = MilestoneDraft::new(title);
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            if let Some(amount) = amount {
                draft = draft.with_amount(amount);
            }
            if let Some(due_date) = due_date {
                draft = draft.with_due_date(due_date);
            }
            let contract = mutator.add_milestone(contract, draft)?;
            ctx.emit(ctx.renderer.contract(&contract))
        }
        MilestoneCommand::List { contract } => {
            let milestones = ctx.services.contracts.milestones(contract)?;
            ctx.emit(ctx.renderer.milestones(&milestones))
        }
        MilestoneCommand::Show {
            contract,
            milestone,
        } => {
            let milestone = ctx.services.contracts.milestone(contract, milestone)?;
            ctx.emit(ctx.renderer.milestone(&milestone))
        }
        MilestoneCommand::Status {
            contract,
            milestone,
            status,
        } => {
            let contract = mutator.change_milestone_status(contract, milestone, status)?;
            ctx.emit(ctx.renderer.contract(&contract))
        }
        MilestoneCommand::Edit {
            contract,
            milestone,
            title,
            description,
            amount,
            due_date,
        } => {
            let patch = MilestonePatch {
                title,
                description,
                amount,
                due_date,
            };
            let milestone = mutator.edit_milestone(contract, milestone, patch)?;
            ctx.emit(ctx.renderer.milestone(&milestone))
        }
        MilestoneCommand::Delete {
            contract,
            milestone,
        } => {
            let contract = mutator.delete_milestone(contract, milestone)?;
            ctx.emit(ctx.renderer.contract(&contract))
        }
    }
}
