use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger::{EntryKind, Frequency, RecurringDefinition, RecurringPatch};
use crate::storage::RecurringStore;

use super::{validate_amount, validate_label, ServiceResult};

pub struct RecurringService;

impl RecurringService {
    /// Creates a definition after checking the amount, labels, and window.
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        store: &dyn RecurringStore,
        owner_id: Uuid,
        kind: EntryKind,
        amount_cents: i64,
        category: &str,
        description: &str,
        frequency: Frequency,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> ServiceResult<RecurringDefinition> {
        validate_amount(amount_cents)?;
        let category = validate_label("category", category)?;
        let description = validate_label("description", description)?;
        validate_window(start_date, end_date)?;
        let mut definition = RecurringDefinition::new(
            owner_id,
            kind,
            amount_cents,
            category,
            description,
            frequency,
            start_date,
        );
        definition.end_date = end_date;
        store.insert(definition)
    }

    /// Applies a patch, re-validating the resulting schedule window.
    pub fn update(
        store: &dyn RecurringStore,
        id: Uuid,
        owner_id: Uuid,
        mut patch: RecurringPatch,
    ) -> ServiceResult<RecurringDefinition> {
        let existing = store
            .get(id, owner_id)?
            .ok_or_else(|| CoreError::NotFound("recurring definition".into()))?;
        if let Some(amount) = patch.amount_cents {
            validate_amount(amount)?;
        }
        if let Some(category) = &patch.category {
            patch.category = Some(validate_label("category", category)?);
        }
        if let Some(description) = &patch.description {
            patch.description = Some(validate_label("description", description)?);
        }
        let start = patch.start_date.unwrap_or(existing.start_date);
        let end = patch.end_date.unwrap_or(existing.end_date);
        validate_window(start, end)?;
        store
            .update(id, owner_id, &patch)?
            .ok_or_else(|| CoreError::NotFound("recurring definition".into()))
    }

    /// Pauses or resumes materialization without touching the schedule.
    pub fn set_active(
        store: &dyn RecurringStore,
        id: Uuid,
        owner_id: Uuid,
        active: bool,
    ) -> ServiceResult<RecurringDefinition> {
        let patch = RecurringPatch {
            active: Some(active),
            ..Default::default()
        };
        store
            .update(id, owner_id, &patch)?
            .ok_or_else(|| CoreError::NotFound("recurring definition".into()))
    }

    pub fn remove(store: &dyn RecurringStore, id: Uuid, owner_id: Uuid) -> ServiceResult<()> {
        if store.delete(id, owner_id)? {
            Ok(())
        } else {
            Err(CoreError::NotFound("recurring definition".into()))
        }
    }

    pub fn list(
        store: &dyn RecurringStore,
        owner_id: Uuid,
    ) -> ServiceResult<Vec<RecurringDefinition>> {
        store.list(owner_id)
    }
}

fn validate_window(start_date: NaiveDate, end_date: Option<NaiveDate>) -> ServiceResult<()> {
    if let Some(end) = end_date {
        if end < start_date {
            return Err(CoreError::InvalidInput(
                "end date must not precede start date".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::storage::MemoryStore;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn end_before_start_is_rejected() {
        let store = MemoryStore::new();
        let err = RecurringService::add(
            &store,
            Uuid::new_v4(),
            EntryKind::Expense,
            1200,
            "Rent",
            "Monthly rent",
            Frequency::Monthly,
            date(2024, 6, 1),
            Some(date(2024, 1, 1)),
        )
        .expect_err("inverted window must fail");
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn update_checks_window_against_existing_fields() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let definition = RecurringService::add(
            &store,
            owner,
            EntryKind::Expense,
            1200,
            "Rent",
            "Monthly rent",
            Frequency::Monthly,
            date(2024, 1, 1),
            Some(date(2024, 12, 31)),
        )
        .unwrap();

        // Moving the start past the stored end must fail.
        let patch = RecurringPatch {
            start_date: Some(date(2025, 1, 1)),
            ..Default::default()
        };
        let err = RecurringService::update(&store, definition.id, owner, patch)
            .expect_err("start beyond end must fail");
        assert!(matches!(err, CoreError::InvalidInput(_)));

        // Clearing the end date makes the same move legal.
        let patch = RecurringPatch {
            start_date: Some(date(2025, 1, 1)),
            end_date: Some(None),
            ..Default::default()
        };
        let updated = RecurringService::update(&store, definition.id, owner, patch).unwrap();
        assert_eq!(updated.start_date, date(2025, 1, 1));
        assert_eq!(updated.end_date, None);
    }

    #[test]
    fn pause_and_resume_toggle_the_active_flag() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let definition = RecurringService::add(
            &store,
            owner,
            EntryKind::Expense,
            500,
            "Gym",
            "Membership",
            Frequency::Monthly,
            date(2024, 1, 1),
            None,
        )
        .unwrap();

        let paused = RecurringService::set_active(&store, definition.id, owner, false).unwrap();
        assert!(!paused.active);
        let resumed = RecurringService::set_active(&store, definition.id, owner, true).unwrap();
        assert!(resumed.active);
    }

    #[test]
    fn remove_is_owner_scoped() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let definition = RecurringService::add(
            &store,
            owner,
            EntryKind::Income,
            100_000,
            "Salary",
            "Paycheck",
            Frequency::Monthly,
            date(2024, 1, 1),
            None,
        )
        .unwrap();

        let err = RecurringService::remove(&store, definition.id, Uuid::new_v4())
            .expect_err("foreign owner must not delete");
        assert!(matches!(err, CoreError::NotFound(_)));
        RecurringService::remove(&store, definition.id, owner).unwrap();
    }
}
