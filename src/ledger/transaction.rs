use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a ledger entry adds to or subtracts from the owner's balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        };
        f.write_str(label)
    }
}

/// A single income or expense record, owned exclusively by one owner.
///
/// Amounts are integer minor units (cents) so repeated aggregation stays
/// exact. The category is a free-text label, not a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: EntryKind,
    pub amount_cents: i64,
    pub category: String,
    pub description: String,
    pub occurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        owner_id: Uuid,
        kind: EntryKind,
        amount_cents: i64,
        category: impl Into<String>,
        description: impl Into<String>,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            amount_cents,
            category: category.into(),
            description: description.into(),
            occurred_on,
            created_at: Utc::now(),
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self.kind, EntryKind::Income)
    }

    pub fn is_expense(&self) -> bool {
        matches!(self.kind, EntryKind::Expense)
    }
}

/// Field-by-field changes applied to an existing entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntryKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurred_on: Option<NaiveDate>,
}

impl TransactionPatch {
    pub fn has_effect(&self) -> bool {
        self.kind.is_some()
            || self.amount_cents.is_some()
            || self.category.is_some()
            || self.description.is_some()
            || self.occurred_on.is_some()
    }

    pub fn apply_to(&self, transaction: &mut Transaction) {
        if let Some(kind) = self.kind {
            transaction.kind = kind;
        }
        if let Some(amount) = self.amount_cents {
            transaction.amount_cents = amount;
        }
        if let Some(category) = &self.category {
            transaction.category = category.clone();
        }
        if let Some(description) = &self.description {
            transaction.description = description.clone();
        }
        if let Some(occurred_on) = self.occurred_on {
            transaction.occurred_on = occurred_on;
        }
    }
}
