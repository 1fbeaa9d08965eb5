use chrono::{Datelike, Duration, Months, NaiveDate};
use uuid::Uuid;

use crate::ledger::{
    evaluate_budget, monthly_summary, month_window, summarize, BudgetReport, LedgerSummary,
    MonthlySummary, TransactionQuery,
};
use crate::storage::{ProfileStore, TransactionStore};

use super::ServiceResult;

pub struct SummaryService;

impl SummaryService {
    /// All-time aggregate over the owner's full ledger.
    pub fn overall(store: &dyn TransactionStore, owner_id: Uuid) -> ServiceResult<LedgerSummary> {
        let entries = store.list(owner_id, &TransactionQuery::default())?;
        Ok(summarize(&entries))
    }

    /// Month-scoped summary with budget usage and month-over-month insights.
    /// Year and month default to the month containing `today`.
    pub fn monthly(
        transactions: &dyn TransactionStore,
        profiles: &dyn ProfileStore,
        owner_id: Uuid,
        year: Option<i32>,
        month: Option<u32>,
        today: NaiveDate,
    ) -> ServiceResult<MonthlySummary> {
        let year = year.unwrap_or_else(|| today.year());
        let month = month.unwrap_or_else(|| today.month());
        let (start, end) = month_window(year, month)?;

        let current = transactions.list(
            owner_id,
            &TransactionQuery::for_range(start, end - Duration::days(1)),
        )?;
        let previous_first = start.checked_sub_months(Months::new(1)).unwrap_or(start);
        let previous = transactions.list(
            owner_id,
            &TransactionQuery::for_range(previous_first, start - Duration::days(1)),
        )?;
        let budget_cents = profiles.budget_cents(owner_id)?;
        monthly_summary(&current, &previous, year, month, budget_cents)
    }

    /// Advisory budget classification for the month containing `today`.
    /// Owners without a budget get `None`.
    pub fn budget_status(
        transactions: &dyn TransactionStore,
        profiles: &dyn ProfileStore,
        owner_id: Uuid,
        today: NaiveDate,
    ) -> ServiceResult<Option<BudgetReport>> {
        let summary = Self::monthly(transactions, profiles, owner_id, None, None, today)?;
        Ok(evaluate_budget(summary.expenses_cents, summary.budget_cents))
    }
}

#[cfg(test)]
mod tests {
    use crate::ledger::{BudgetState, EntryKind, OwnerProfile, Transaction};
    use crate::storage::MemoryStore;

    use super::*;

    fn seed_profile(store: &MemoryStore, budget_cents: i64) -> Uuid {
        let mut profile = OwnerProfile::new("Ada", "ada@example.com", "hash");
        profile.budget_cents = budget_cents;
        let owner = profile.id;
        ProfileStore::upsert(store, profile).unwrap();
        owner
    }

    fn record(store: &MemoryStore, owner: Uuid, kind: EntryKind, cents: i64, date: NaiveDate) {
        TransactionStore::insert(
            store,
            Transaction::new(owner, kind, cents, "General", "entry", date),
        )
        .unwrap();
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn overall_covers_the_whole_ledger() {
        let store = MemoryStore::new();
        let owner = seed_profile(&store, 0);
        record(&store, owner, EntryKind::Income, 5000, date(2023, 6, 1));
        record(&store, owner, EntryKind::Expense, 1500, date(2024, 1, 10));

        let summary = SummaryService::overall(&store, owner).unwrap();
        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.balance_cents, 3500);
    }

    #[test]
    fn monthly_defaults_to_the_current_month() {
        let store = MemoryStore::new();
        let owner = seed_profile(&store, 100_000);
        record(&store, owner, EntryKind::Expense, 40_000, date(2024, 3, 10));
        record(&store, owner, EntryKind::Expense, 99_999, date(2024, 2, 10));

        let summary =
            SummaryService::monthly(&store, &store, owner, None, None, date(2024, 3, 15)).unwrap();
        assert_eq!(summary.year, 2024);
        assert_eq!(summary.month, 3);
        assert_eq!(summary.expenses_cents, 40_000);
        assert_eq!(summary.budget_used_percent, 40.0);
    }

    #[test]
    fn monthly_pulls_previous_month_for_insights() {
        let store = MemoryStore::new();
        let owner = seed_profile(&store, 0);
        record(&store, owner, EntryKind::Expense, 1500, date(2024, 1, 5));
        record(&store, owner, EntryKind::Expense, 1000, date(2023, 12, 20));

        let summary =
            SummaryService::monthly(&store, &store, owner, Some(2024), Some(1), date(2024, 1, 31))
                .unwrap();
        assert_eq!(summary.insights.expense_change_percent, 50.0);
    }

    #[test]
    fn budget_status_matches_the_spending_scenario() {
        let store = MemoryStore::new();
        let owner = seed_profile(&store, 100_000);
        record(&store, owner, EntryKind::Expense, 120_000, date(2024, 5, 2));

        let report = SummaryService::budget_status(&store, &store, owner, date(2024, 5, 20))
            .unwrap()
            .unwrap();
        assert_eq!(report.state, BudgetState::OverLimit);
        assert_eq!(report.remaining_cents, 0);
        assert_eq!(report.overage_cents, 20_000);
    }

    #[test]
    fn budget_status_is_silent_without_a_budget() {
        let store = MemoryStore::new();
        let owner = seed_profile(&store, 0);
        record(&store, owner, EntryKind::Expense, 120_000, date(2024, 5, 2));

        let report =
            SummaryService::budget_status(&store, &store, owner, date(2024, 5, 20)).unwrap();
        assert!(report.is_none());
    }
}
