//! Contract command handlers

use anyhow::Result;

use pactline::application::ContractQuery;
use pactline::domain::entities::{ContractPatch, NewContract, Owner};
use pactline::presentation::cli::{
    ContractCommand, ContractCreateArgs, ContractListArgs, ContractUpdateArgs,
};

use super::CommandContext;

pub fn run(ctx: &CommandContext, command: ContractCommand) -> Result<()> {
    let contracts = &ctx.services.contracts;
    match command {
        ContractCommand::Create(args) => {
            let contract = contracts.create(new_contract(args))?;
            ctx.emit(ctx.renderer.contract(&contract))
        }
        ContractCommand::Show { id } => {
            let contract = contracts.get(id)?;
            ctx.emit(ctx.renderer.contract(&contract))
        }
        ContractCommand::List(args) => {
            let records = contracts.list(&query(args))?;
            ctx.emit(ctx.renderer.contract_list(&records))
        }
        ContractCommand::Update { id, fields } => {
            let contract = contracts.update(id, patch(fields))?;
            ctx.emit(ctx.renderer.contract(&contract))
        }
        ContractCommand::Delete { id } => {
            contracts.delete(id)?;
            ctx.emit(ctx.renderer.message(&format!("Deleted contract {}", id)))
        }
    }
}

fn new_contract(args: ContractCreateArgs) -> NewContract {
    NewContract {
        title: args.title,
        description: args.description,
        owner: Owner {
            name: args.owner_name,
            email: args.owner_email,
            phone: args.owner_phone,
        },
        kind: args.kind,
        status: args.status,
        total: args.total,
        start_date: args.start_date,
        deadline: args.deadline,
        next_deadline: args.next_deadline,
    }
}

fn patch(args: ContractUpdateArgs) -> ContractPatch {
    ContractPatch {
        title: args.title,
        description: args.description,
        owner_name: args.owner_name,
        owner_email: args.owner_email,
        owner_phone: args.owner_phone,
        kind: args.kind,
        status: args.status,
        total: args.total,
        start_date: args.start_date,
        deadline: args.deadline,
        next_deadline: args.next_deadline,
    }
}

fn query(args: ContractListArgs) -> ContractQuery {
    let mut query = ContractQuery::new().with_page(args.page, args.limit);
    if let Some(search) = args.search {
        query = query.with_search(search);
    }
    if let Some(kind) = args.kind {
        query = query.with_kind(kind);
    }
    if let Some(status) = args.status {
        query = query.with_status(status);
    }
    if let Some(field) = args.sort_by {
        query = query.with_sort(field, args.order);
    }
    query
}
