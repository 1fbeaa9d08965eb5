//! Materialization of due recurring definitions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::storage::{RecurringStore, TransactionStore};

use super::ServiceResult;

/// Walks an owner's active definitions and materializes one ledger entry
/// for every definition whose frequency threshold has elapsed.
pub struct RecurrenceScheduler;

impl RecurrenceScheduler {
    /// Processes every due definition once and returns how many fired.
    ///
    /// Each definition advances independently; there is no batch atomicity,
    /// so entries materialized before a failure stay committed. The cursor
    /// is claimed with a conditional write *before* the entry is inserted:
    /// a concurrent caller that loses the race gets a conflict and skips,
    /// which keeps each cycle to a single materialized entry. Missed cycles
    /// are never caught up; a definition fires at most once per call.
    pub fn process_due(
        recurring: &dyn RecurringStore,
        transactions: &dyn TransactionStore,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<usize> {
        let candidates = recurring.list_active(owner_id, now.date_naive())?;
        let mut processed = 0usize;
        for definition in candidates {
            if !definition.is_due(now) {
                continue;
            }
            match recurring.advance(definition.id, owner_id, definition.last_materialized_at, now)
            {
                Ok(()) => {}
                Err(CoreError::Conflict(_)) => {
                    tracing::debug!(
                        definition = %definition.id,
                        "cycle already claimed elsewhere, skipping"
                    );
                    continue;
                }
                Err(err) => return Err(err),
            }
            transactions.insert(definition.materialize(now))?;
            processed += 1;
        }
        if processed > 0 {
            tracing::info!(owner = %owner_id, processed, "materialized recurring transactions");
        }
        Ok(processed)
    }
}
