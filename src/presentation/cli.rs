//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! Global flags (--json, --verbose, --config, --store, --lock-timeout-ms)
//! are inherited by all subcommands.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use crate::application::{SortField, SortOrder};
use crate::domain::value_objects::{
    ContractId, ContractKind, ContractStatus, MilestoneId, MilestoneStatus,
};

/// Pactline - contract and milestone ledger
#[derive(Parser, Debug)]
#[command(name = "pactline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: ./pactline.toml or the user config)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ledger file path, or `memory`
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<String>,

    /// How long to wait for a busy contract
    #[arg(long, global = true, value_name = "MS")]
    pub lock_timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, inspect and edit contracts
    #[command(subcommand)]
    Contract(ContractCommand),

    /// Add milestones and move them through their lifecycle
    #[command(subcommand)]
    Milestone(MilestoneCommand),
}

#[derive(Subcommand, Debug)]
pub enum ContractCommand {
    /// Create a contract
    Create(ContractCreateArgs),

    /// Show a contract with its milestones
    Show { id: ContractId },

    /// List contracts
    List(ContractListArgs),

    /// Edit client-editable contract fields
    Update {
        id: ContractId,

        #[command(flatten)]
        fields: ContractUpdateArgs,
    },

    /// Delete a contract and all of its milestones
    Delete { id: ContractId },
}

#[derive(Args, Debug)]
pub struct ContractCreateArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub owner_name: String,

    #[arg(long)]
    pub owner_email: Option<String>,

    #[arg(long)]
    pub owner_phone: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, value_enum)]
    pub kind: Option<ContractKind>,

    #[arg(long, value_enum)]
    pub status: Option<ContractStatus>,

    /// RFC 3339 or YYYY-MM-DD (default: now)
    #[arg(long, value_parser = parse_date)]
    pub start_date: Option<DateTime<Utc>>,

    #[arg(long, value_parser = parse_date)]
    pub deadline: Option<DateTime<Utc>>,

    #[arg(long, value_parser = parse_date)]
    pub next_deadline: Option<DateTime<Utc>>,

    #[arg(long)]
    pub total: f64,
}

#[derive(Args, Debug, Default)]
pub struct ContractUpdateArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub owner_name: Option<String>,

    #[arg(long)]
    pub owner_email: Option<String>,

    #[arg(long)]
    pub owner_phone: Option<String>,

    #[arg(long, value_enum)]
    pub kind: Option<ContractKind>,

    #[arg(long, value_enum)]
    pub status: Option<ContractStatus>,

    #[arg(long)]
    pub total: Option<f64>,

    #[arg(long, value_parser = parse_date)]
    pub start_date: Option<DateTime<Utc>>,

    #[arg(long, value_parser = parse_date)]
    pub deadline: Option<DateTime<Utc>>,

    #[arg(long, value_parser = parse_date)]
    pub next_deadline: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
pub struct ContractListArgs {
    /// Match title or owner name, email, phone
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, value_enum)]
    pub kind: Option<ContractKind>,

    #[arg(long, value_enum)]
    pub status: Option<ContractStatus>,

    #[arg(long, value_enum)]
    pub sort_by: Option<SortField>,

    #[arg(long, value_enum, default_value = "asc")]
    pub order: SortOrder,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

#[derive(Subcommand, Debug)]
pub enum MilestoneCommand {
    /// Append a milestone to a contract
    Add {
        contract: ContractId,

        #[arg(long)]
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Amount credited to the contract when completed (default: 0)
        #[arg(long)]
        amount: Option<f64>,

        #[arg(long, value_parser = parse_date)]
        due_date: Option<DateTime<Utc>>,
    },

    /// List a contract's milestones in creation order
    List { contract: ContractId },

    /// Show one milestone
    Show {
        contract: ContractId,
        milestone: MilestoneId,
    },

    /// Change a milestone's status
    Status {
        contract: ContractId,
        milestone: MilestoneId,

        #[arg(value_enum)]
        status: MilestoneStatus,
    },

    /// Edit title, description, amount or due date
    Edit {
        contract: ContractId,
        milestone: MilestoneId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        amount: Option<f64>,

        #[arg(long, value_parser = parse_date)]
        due_date: Option<DateTime<Utc>>,
    },

    /// Delete a milestone
    Delete {
        contract: ContractId,
        milestone: MilestoneId,
    },
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC)
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{}': expected RFC 3339 or YYYY-MM-DD", raw))
}
