//! Aggregate reporting over transaction snapshots.
//!
//! Every function here is a pure computation over already-fetched data; all
//! money figures are exact integer cents and only percentages use floats.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

use super::transaction::Transaction;

/// Aggregate figures for an arbitrary transaction snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LedgerSummary {
    pub total_income_cents: i64,
    pub total_expenses_cents: i64,
    pub balance_cents: i64,
    pub transaction_count: usize,
    pub expenses_by_category: BTreeMap<String, i64>,
}

/// Totals, balance, and per-category expense breakdown for a snapshot.
pub fn summarize(transactions: &[Transaction]) -> LedgerSummary {
    let mut summary = LedgerSummary {
        transaction_count: transactions.len(),
        ..Default::default()
    };
    for transaction in transactions {
        if transaction.is_income() {
            summary.total_income_cents += transaction.amount_cents;
        } else {
            summary.total_expenses_cents += transaction.amount_cents;
            *summary
                .expenses_by_category
                .entry(transaction.category.clone())
                .or_insert(0) += transaction.amount_cents;
        }
    }
    summary.balance_cents = summary.total_income_cents - summary.total_expenses_cents;
    summary
}

/// The heaviest expense category of a month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopCategory {
    pub name: String,
    pub amount_cents: i64,
}

/// Month-over-month signals derived alongside the summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyInsights {
    /// Percent change vs. the prior month; positive means spending grew.
    pub expense_change_percent: f64,
    pub top_category: Option<TopCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub income_cents: i64,
    pub expenses_cents: i64,
    pub balance_cents: i64,
    pub budget_cents: i64,
    pub budget_used_percent: f64,
    pub budget_remaining_cents: i64,
    pub insights: MonthlyInsights,
}

/// Half-open `[first-of-month, first-of-next-month)` window.
pub fn month_window(year: i32, month: u32) -> CoreResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::InvalidInput(format!("invalid month {year}-{month}")))?;
    let end = start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| CoreError::InvalidInput(format!("invalid month {year}-{month}")))?;
    Ok((start, end))
}

/// Month-scoped summary with budget usage and insight figures.
///
/// Both snapshots may contain out-of-window entries; each is narrowed to its
/// own month before aggregation. Percentages are rounded to two decimals,
/// cent figures are exact.
pub fn monthly_summary(
    transactions: &[Transaction],
    previous_month_transactions: &[Transaction],
    year: i32,
    month: u32,
    budget_cents: i64,
) -> CoreResult<MonthlySummary> {
    let (start, end) = month_window(year, month)?;
    let previous_start = start
        .checked_sub_months(Months::new(1))
        .ok_or_else(|| CoreError::InvalidInput(format!("invalid month {year}-{month}")))?;

    let mut income_cents = 0i64;
    let mut expenses_cents = 0i64;
    let mut expenses_by_category: BTreeMap<&str, i64> = BTreeMap::new();
    for transaction in in_window(transactions, start, end) {
        if transaction.is_income() {
            income_cents += transaction.amount_cents;
        } else {
            expenses_cents += transaction.amount_cents;
            *expenses_by_category
                .entry(transaction.category.as_str())
                .or_insert(0) += transaction.amount_cents;
        }
    }

    let previous_expenses_cents: i64 = in_window(previous_month_transactions, previous_start, start)
        .filter(|txn| txn.is_expense())
        .map(|txn| txn.amount_cents)
        .sum();

    let expense_change_percent = if previous_expenses_cents > 0 {
        round_percent(
            100.0 * (expenses_cents - previous_expenses_cents) as f64
                / previous_expenses_cents as f64,
        )
    } else {
        0.0
    };

    // Ties resolve to the lexicographically smallest label: iteration is
    // label-ascending and only a strictly larger total replaces the leader.
    let top_category = expenses_by_category
        .iter()
        .fold(None::<TopCategory>, |best, (name, amount)| match best {
            Some(current) if current.amount_cents >= *amount => Some(current),
            _ => Some(TopCategory {
                name: (*name).to_string(),
                amount_cents: *amount,
            }),
        });

    let budget_used_percent = if budget_cents > 0 {
        round_percent(100.0 * expenses_cents as f64 / budget_cents as f64)
    } else {
        0.0
    };

    Ok(MonthlySummary {
        year,
        month,
        income_cents,
        expenses_cents,
        balance_cents: income_cents - expenses_cents,
        budget_cents,
        budget_used_percent,
        budget_remaining_cents: (budget_cents - expenses_cents).max(0),
        insights: MonthlyInsights {
            expense_change_percent,
            top_category,
        },
    })
}

fn in_window<'a>(
    transactions: &'a [Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> impl Iterator<Item = &'a Transaction> {
    transactions
        .iter()
        .filter(move |txn| txn.occurred_on >= start && txn.occurred_on < end)
}

pub(crate) fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
