//! Ledger domain models, query types, and the reporting engines.

pub mod budget;
pub mod category;
pub mod profile;
pub mod query;
pub mod recurring;
pub mod summary;
pub mod transaction;

pub use budget::{evaluate_budget, BudgetReport, BudgetState};
pub use category::{Category, CategoryPatch};
pub use profile::{OwnerProfile, ProfilePatch, Theme};
pub use query::{SortDirection, SortField, TransactionPage, TransactionQuery};
pub use recurring::{Frequency, RecurringDefinition, RecurringPatch};
pub use summary::{
    monthly_summary, month_window, summarize, LedgerSummary, MonthlyInsights, MonthlySummary,
    TopCategory,
};
pub use transaction::{EntryKind, Transaction, TransactionPatch};
