//! Filtering, sorting, and pagination over transaction snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

use super::transaction::{EntryKind, Transaction};

/// Field a transaction listing is ordered by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Category,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Pass-through listing parameters: every field is optional and the default
/// query returns the owner's whole ledger, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntryKind>,
    /// Case-insensitive substring match on the category label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Inclusive lower bound on `occurred_on`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on `occurred_on`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring match on description or category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub sort_direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl TransactionQuery {
    /// Query covering an inclusive date range, everything else defaulted.
    pub fn for_range(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            date_from: Some(from),
            date_to: Some(to),
            ..Default::default()
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if transaction.kind != kind {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !contains_ignore_case(&transaction.category, category) {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if transaction.occurred_on < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if transaction.occurred_on > to {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            if !contains_ignore_case(&transaction.description, needle)
                && !contains_ignore_case(&transaction.category, needle)
            {
                return false;
            }
        }
        true
    }

    /// Applies filter, sort, and pagination to a snapshot in one pass.
    pub fn apply(&self, snapshot: &[Transaction]) -> CoreResult<Vec<Transaction>> {
        let mut matched: Vec<Transaction> = snapshot
            .iter()
            .filter(|txn| self.matches(txn))
            .cloned()
            .collect();
        self.sort(&mut matched);
        self.paginate(matched)
    }

    pub fn sort(&self, entries: &mut [Transaction]) {
        let field = self.sort_by;
        let direction = self.sort_direction;
        entries.sort_by(|a, b| {
            let ordering = match field {
                SortField::Date => a.occurred_on.cmp(&b.occurred_on),
                SortField::Amount => a.amount_cents.cmp(&b.amount_cents),
                SortField::Category => a.category.cmp(&b.category),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    fn paginate(&self, entries: Vec<Transaction>) -> CoreResult<Vec<Transaction>> {
        let (page, limit) = match (self.page, self.limit) {
            (None, None) => return Ok(entries),
            (page, limit) => (page.unwrap_or(1), limit.unwrap_or(DEFAULT_PAGE_SIZE)),
        };
        if page == 0 {
            return Err(CoreError::InvalidInput("page must be at least 1".into()));
        }
        if limit == 0 {
            return Err(CoreError::InvalidInput("limit must be at least 1".into()));
        }
        let skip = (page as usize - 1) * limit as usize;
        Ok(entries
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .collect())
    }

    pub fn page_size(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// One page of query results along with pagination bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub pages: usize,
}

impl TransactionPage {
    pub fn new(transactions: Vec<Transaction>, page: u32, limit: u32, total: usize) -> Self {
        let pages = total.div_ceil(limit.max(1) as usize);
        Self {
            transactions,
            page,
            limit,
            total,
            pages,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
