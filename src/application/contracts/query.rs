//! Contract listing query

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::entities::ContractRecord;
use crate::domain::value_objects::{ContractKind, ContractStatus};
use crate::error::{PactError, PactResult};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Field to sort contract listings by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Total,
    Paid,
    Progress,
    Deadline,
    #[value(alias = "next_deadline")]
    NextDeadline,
    #[value(alias = "start_date")]
    StartDate,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Search, filter, sort and pagination for `ContractService::list`
#[derive(Debug, Clone, PartialEq)]
pub struct ContractQuery {
    /// Case-insensitive substring of title or owner name, email, phone
    pub search: Option<String>,
    pub kind: Option<ContractKind>,
    pub status: Option<ContractStatus>,
    pub sort_by: Option<SortField>,
    pub order: SortOrder,
    /// 1-based
    pub page: u32,
    pub limit: u32,
}

impl Default for ContractQuery {
    fn default() -> Self {
        Self {
            search: None,
            kind: None,
            status: None,
            sort_by: None,
            order: SortOrder::Asc,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ContractQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_kind(mut self, kind: ContractKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_status(mut self, status: ContractStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = Some(field);
        self.order = order;
        self
    }

    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    pub fn validate(&self) -> PactResult<()> {
        if self.page < 1 || self.limit < 1 {
            return Err(PactError::Validation {
                field: "page".to_string(),
                message: "page and limit must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Filter, sort and paginate `records`
    pub fn apply(&self, mut records: Vec<ContractRecord>) -> Vec<ContractRecord> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        records.retain(|r| {
            self.kind.is_none_or(|kind| r.kind() == kind)
                && self.status.is_none_or(|status| r.status() == status)
                && needle.as_deref().is_none_or(|n| matches_search(r, n))
        });

        records.sort_by_key(|r| r.id());
        if let Some(field) = self.sort_by {
            records.sort_by(|a, b| compare(a, b, field, self.order));
        }

        let skip = (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize);
        records
            .into_iter()
            .skip(skip)
            .take(self.limit as usize)
            .collect()
    }
}

fn matches_search(record: &ContractRecord, needle: &str) -> bool {
    let owner = record.owner();
    std::iter::once(record.title())
        .chain(std::iter::once(owner.name.as_str()))
        .chain(owner.email.as_deref())
        .chain(owner.phone.as_deref())
        .any(|field| field.to_lowercase().contains(needle))
}

fn compare(a: &ContractRecord, b: &ContractRecord, field: SortField, order: SortOrder) -> Ordering {
    let directed = |ordering: Ordering| match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };
    // Missing dates sort last in either direction
    let dates = |x: Option<_>, y: Option<_>| match (x, y) {
        (Some(x), Some(y)) => directed(Ord::cmp(&x, &y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    match field {
        SortField::Total => directed(a.total().total_cmp(&b.total())),
        SortField::Paid => directed(a.paid().total_cmp(&b.paid())),
        SortField::Progress => directed(a.progress().value().total_cmp(&b.progress().value())),
        SortField::Deadline => dates(a.deadline(), b.deadline()),
        SortField::NextDeadline => dates(a.next_deadline(), b.next_deadline()),
        SortField::StartDate => directed(a.start_date().cmp(&b.start_date())),
    }
}
