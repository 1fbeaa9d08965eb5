use serde::{Deserialize, Serialize};

use super::summary::round_percent;

/// Advisory classification of spending against the monthly budget. Used for
/// UI signaling only; nothing is enforced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetState {
    UnderLimit,
    NearLimit,
    OverLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetReport {
    pub state: BudgetState,
    pub used_percent: f64,
    pub remaining_cents: i64,
    pub overage_cents: i64,
}

/// Pure classification of (expenses, budget). Owners without a budget get no
/// report. Exactly 100% usage is near-limit; over-limit requires spending to
/// strictly exceed the budget.
pub fn evaluate_budget(expenses_cents: i64, budget_cents: i64) -> Option<BudgetReport> {
    if budget_cents <= 0 {
        return None;
    }
    let state = if expenses_cents > budget_cents {
        BudgetState::OverLimit
    } else if expenses_cents * 5 > budget_cents * 4 {
        BudgetState::NearLimit
    } else {
        BudgetState::UnderLimit
    };
    Some(BudgetReport {
        state,
        used_percent: round_percent(100.0 * expenses_cents as f64 / budget_cents as f64),
        remaining_cents: (budget_cents - expenses_cents).max(0),
        overage_cents: (expenses_cents - budget_cents).max(0),
    })
}
