//! Output Rendering
//!
//! Renders contracts and milestones as text or JSON. Text output shows
//! progress rounded to a whole percent; JSON carries the raw value plus
//! `progress_rounded`.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{Contract, ContractRecord, Milestone};
use crate::error::{ErrorClass, PactError};

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Serialize)]
struct ContractJson<'a> {
    #[serde(flatten)]
    contract: &'a Contract,
    progress_rounded: u8,
}

#[derive(Serialize)]
struct RecordJson<'a> {
    #[serde(flatten)]
    record: &'a ContractRecord,
    progress_rounded: u8,
}

#[derive(Serialize)]
struct ErrorJson<'a> {
    class: &'a str,
    message: String,
    retryable: bool,
}

/// Renders use case results in one format
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    pub format: OutputFormat,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn contract(&self, contract: &Contract) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&ContractJson {
                contract,
                progress_rounded: contract.progress().rounded(),
            }),
            OutputFormat::Text => Ok(contract_text(contract)),
        }
    }

    pub fn contract_list(&self, records: &[ContractRecord]) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<RecordJson<'_>> = records
                    .iter()
                    .map(|record| RecordJson {
                        record,
                        progress_rounded: record.progress().rounded(),
                    })
                    .collect();
                serde_json::to_string_pretty(&items)
            }
            OutputFormat::Text if records.is_empty() => Ok("No contracts found.".to_string()),
            OutputFormat::Text => Ok(records
                .iter()
                .map(record_line)
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    pub fn milestone(&self, milestone: &Milestone) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(milestone),
            OutputFormat::Text => Ok(milestone_text(milestone)),
        }
    }

    pub fn milestones(&self, milestones: &[Milestone]) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(milestones),
            OutputFormat::Text if milestones.is_empty() => Ok("No milestones.".to_string()),
            OutputFormat::Text => Ok(milestones
                .iter()
                .map(milestone_line)
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Confirmation for operations without a result body
    pub fn message(&self, message: &str) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string(&serde_json::json!({ "message": message })),
            OutputFormat::Text => Ok(message.to_string()),
        }
    }

    pub fn error(&self, err: &PactError) -> String {
        match self.format {
            OutputFormat::Json => {
                let body = ErrorJson {
                    class: class_name(err.class()),
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                };
                serde_json::to_string(&serde_json::json!({ "error": body }))
                    .unwrap_or_else(|_| format!("error: {}", err))
            }
            OutputFormat::Text => format!("error: {}", err),
        }
    }
}

fn class_name(class: ErrorClass) -> &'static str {
    match class {
        ErrorClass::NotFound => "not_found",
        ErrorClass::InvalidTransition => "invalid_transition",
        ErrorClass::Conflict => "conflict",
        ErrorClass::StorageFailure => "storage_failure",
        ErrorClass::Invalid => "invalid",
    }
}

fn date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

fn optional_date(value: Option<DateTime<Utc>>) -> String {
    value.map(date).unwrap_or_else(|| "-".to_string())
}

fn contract_text(contract: &Contract) -> String {
    let record = contract.record();
    let owner = record.owner();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Contract #{}  {}  [{}, {}]",
        record.id(),
        record.title(),
        record.status(),
        record.kind()
    );
    if !record.description().is_empty() {
        let _ = writeln!(out, "  {}", record.description());
    }
    let mut owner_line = owner.name.clone();
    if let Some(email) = &owner.email {
        let _ = write!(owner_line, " <{}>", email);
    }
    if let Some(phone) = &owner.phone {
        let _ = write!(owner_line, " {}", phone);
    }
    let _ = writeln!(out, "  Owner:     {}", owner_line);
    let _ = writeln!(
        out,
        "  Total:     {:.2}   Paid: {:.2}   Progress: {}",
        record.total(),
        record.paid(),
        record.progress()
    );
    let _ = writeln!(
        out,
        "  Start:     {}   Deadline: {}   Next: {}",
        date(record.start_date()),
        optional_date(record.deadline()),
        optional_date(record.next_deadline())
    );

    if contract.milestones().is_empty() {
        let _ = write!(out, "  No milestones.");
    } else {
        let _ = writeln!(out, "  Milestones:");
        let lines: Vec<String> = contract
            .milestones()
            .iter()
            .map(|m| format!("    {}", milestone_line(m)))
            .collect();
        out.push_str(&lines.join("\n"));
    }
    out
}

fn record_line(record: &ContractRecord) -> String {
    format!(
        "#{:<4} {:<12} {:<32} {:>10.2} / {:<10.2} {:>4}  {}",
        record.id(),
        record.status(),
        record.title(),
        record.paid(),
        record.total(),
        record.progress(),
        record.owner().name
    )
}

fn milestone_line(milestone: &Milestone) -> String {
    format!(
        "#{:<4} {:<12} {:<32} {:>10.2}  due {}",
        milestone.id(),
        milestone.status(),
        milestone.title(),
        milestone.amount(),
        optional_date(milestone.due_date())
    )
}

fn milestone_text(milestone: &Milestone) -> String {
    let mut out = format!(
        "Milestone #{}  {}  [{}]\n  Contract:  #{}\n  Amount:    {:.2}\n  Due:       {}",
        milestone.id(),
        milestone.title(),
        milestone.status(),
        milestone.contract_id(),
        milestone.amount(),
        optional_date(milestone.due_date())
    );
    if !milestone.description().is_empty() {
        let _ = write!(out, "\n  {}", milestone.description());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewContract, Owner};
    use crate::domain::value_objects::ContractId;

    fn contract() -> Contract {
        let record = ContractRecord::create(
            ContractId::new(3),
            NewContract {
                title: "Brand refresh".to_string(),
                owner: Owner {
                    name: "Alan".to_string(),
                    email: Some("alan@example.com".to_string()),
                    phone: None,
                },
                total: 1500.0,
                ..NewContract::default()
            },
            Utc::now(),
        )
        .unwrap();
        Contract::new(record, Vec::new())
    }

    #[test]
    fn json_includes_rounded_progress_and_milestones() {
        let rendered = Renderer::new(OutputFormat::Json)
            .contract(&contract())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["id"], 3);
        assert_eq!(value["title"], "Brand refresh");
        assert_eq!(value["progress"], 0.0);
        assert_eq!(value["progress_rounded"], 0);
        assert_eq!(value["status"], "PENDING");
        assert!(value["milestones"].as_array().unwrap().is_empty());
    }

    #[test]
    fn text_shows_owner_and_progress() {
        let rendered = Renderer::new(OutputFormat::Text)
            .contract(&contract())
            .unwrap();

        assert!(rendered.starts_with("Contract #3  Brand refresh  [PENDING, FIXED]"));
        assert!(rendered.contains("Alan <alan@example.com>"));
        assert!(rendered.contains("Progress: 0%"));
        assert!(rendered.contains("No milestones."));
    }

    #[test]
    fn empty_list_text() {
        let rendered = Renderer::default().contract_list(&[]).unwrap();
        assert_eq!(rendered, "No contracts found.");
    }

    #[test]
    fn json_error_carries_class() {
        let err = PactError::ContractNotFound(ContractId::new(8));
        let rendered = Renderer::new(OutputFormat::Json).error(&err);
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["error"]["class"], "not_found");
        assert_eq!(value["error"]["message"], "contract 8 not found");
        assert_eq!(value["error"]["retryable"], false);
    }
}
