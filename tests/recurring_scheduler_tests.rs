use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use fintrack_core::errors::CoreError;
use fintrack_core::ledger::{
    EntryKind, Frequency, RecurringDefinition, RecurringPatch, TransactionQuery,
};
use fintrack_core::services::RecurrenceScheduler;
use fintrack_core::storage::{
    MemoryStore, RecurringStore, Result as StoreResult, TransactionStore,
};

fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 30, 0).unwrap()
}

fn definition(owner: Uuid, frequency: Frequency, start: NaiveDate) -> RecurringDefinition {
    RecurringDefinition::new(
        owner,
        EntryKind::Expense,
        120_000,
        "Rent",
        "Monthly rent",
        frequency,
        start,
    )
}

#[test]
fn monthly_definition_materializes_on_the_reference_day() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    let stored = RecurringStore::insert(
        &store,
        definition(
            owner,
            Frequency::Monthly,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ),
    )
    .unwrap();

    let now = utc(2024, 2, 5);
    let processed = RecurrenceScheduler::process_due(&store, &store, owner, now).unwrap();
    assert_eq!(processed, 1);

    let entries = TransactionStore::list(&store, owner, &TransactionQuery::default()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].occurred_on,
        NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
    );
    assert_eq!(entries[0].amount_cents, 120_000);
    assert_eq!(entries[0].category, "Rent");
    assert_eq!(entries[0].description, "Monthly rent (Recurring)");

    let advanced = RecurringStore::get(&store, stored.id, owner).unwrap().unwrap();
    assert_eq!(advanced.last_materialized_at, Some(now));
}

#[test]
fn reprocessing_within_the_window_is_idempotent() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    RecurringStore::insert(
        &store,
        definition(
            owner,
            Frequency::Weekly,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ),
    )
    .unwrap();

    let now = utc(2024, 1, 10);
    assert_eq!(
        RecurrenceScheduler::process_due(&store, &store, owner, now).unwrap(),
        1
    );
    // Same instant, and again three days later: both inside the 7-day window.
    assert_eq!(
        RecurrenceScheduler::process_due(&store, &store, owner, now).unwrap(),
        0
    );
    assert_eq!(
        RecurrenceScheduler::process_due(
            &store,
            &store,
            owner,
            now + chrono::Duration::days(3)
        )
        .unwrap(),
        0
    );

    let entries = TransactionStore::list(&store, owner, &TransactionQuery::default()).unwrap();
    assert_eq!(entries.len(), 1);
}

#[test]
fn each_frequency_uses_its_fixed_day_threshold() {
    let cases = [
        (Frequency::Daily, 1),
        (Frequency::Weekly, 7),
        (Frequency::Monthly, 30),
        (Frequency::Yearly, 365),
    ];
    for (frequency, days) in cases {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        RecurringStore::insert(
            &store,
            definition(
                owner,
                frequency,
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            ),
        )
        .unwrap();

        let first = utc(2024, 1, 1);
        assert_eq!(
            RecurrenceScheduler::process_due(&store, &store, owner, first).unwrap(),
            1
        );

        let early = first + chrono::Duration::days(days - 1);
        assert_eq!(
            RecurrenceScheduler::process_due(&store, &store, owner, early).unwrap(),
            0,
            "{frequency} fired a day early"
        );

        let due = first + chrono::Duration::days(days);
        assert_eq!(
            RecurrenceScheduler::process_due(&store, &store, owner, due).unwrap(),
            1,
            "{frequency} failed to fire at its threshold"
        );
    }
}

#[test]
fn no_catch_up_for_missed_cycles() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    RecurringStore::insert(
        &store,
        definition(
            owner,
            Frequency::Daily,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ),
    )
    .unwrap();

    // Ten days pass, but a single pass yields a single entry.
    assert_eq!(
        RecurrenceScheduler::process_due(&store, &store, owner, utc(2024, 1, 1)).unwrap(),
        1
    );
    assert_eq!(
        RecurrenceScheduler::process_due(&store, &store, owner, utc(2024, 1, 11)).unwrap(),
        1
    );
    let entries = TransactionStore::list(&store, owner, &TransactionQuery::default()).unwrap();
    assert_eq!(entries.len(), 2);
}

#[test]
fn paused_definition_skips_until_resumed() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    let stored = RecurringStore::insert(
        &store,
        definition(
            owner,
            Frequency::Monthly,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ),
    )
    .unwrap();

    let pause = RecurringPatch {
        active: Some(false),
        ..Default::default()
    };
    RecurringStore::update(&store, stored.id, owner, &pause).unwrap();
    assert_eq!(
        RecurrenceScheduler::process_due(&store, &store, owner, utc(2024, 2, 1)).unwrap(),
        0
    );

    let resume = RecurringPatch {
        active: Some(true),
        ..Default::default()
    };
    RecurringStore::update(&store, stored.id, owner, &resume).unwrap();
    assert_eq!(
        RecurrenceScheduler::process_due(&store, &store, owner, utc(2024, 2, 1)).unwrap(),
        1
    );
}

#[test]
fn owners_are_processed_independently() {
    let store = MemoryStore::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    RecurringStore::insert(&store, definition(alice, Frequency::Monthly, start)).unwrap();
    RecurringStore::insert(&store, definition(bob, Frequency::Monthly, start)).unwrap();

    assert_eq!(
        RecurrenceScheduler::process_due(&store, &store, alice, utc(2024, 2, 1)).unwrap(),
        1
    );
    assert!(
        TransactionStore::list(&store, bob, &TransactionQuery::default())
            .unwrap()
            .is_empty()
    );
}

/// Store double that serves definitions from a stale snapshot, simulating a
/// second scheduler that raced ahead on the same owner.
struct StaleRecurringStore {
    inner: MemoryStore,
    stale: Vec<RecurringDefinition>,
}

impl RecurringStore for StaleRecurringStore {
    fn list(&self, owner_id: Uuid) -> StoreResult<Vec<RecurringDefinition>> {
        RecurringStore::list(&self.inner, owner_id)
    }

    fn list_active(
        &self,
        owner_id: Uuid,
        _as_of: NaiveDate,
    ) -> StoreResult<Vec<RecurringDefinition>> {
        Ok(self
            .stale
            .iter()
            .filter(|definition| definition.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn get(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<RecurringDefinition>> {
        RecurringStore::get(&self.inner, id, owner_id)
    }

    fn insert(&self, definition: RecurringDefinition) -> StoreResult<RecurringDefinition> {
        RecurringStore::insert(&self.inner, definition)
    }

    fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &RecurringPatch,
    ) -> StoreResult<Option<RecurringDefinition>> {
        RecurringStore::update(&self.inner, id, owner_id, patch)
    }

    fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        RecurringStore::delete(&self.inner, id, owner_id)
    }

    fn advance(
        &self,
        id: Uuid,
        owner_id: Uuid,
        expected: Option<DateTime<Utc>>,
        next: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.inner.advance(id, owner_id, expected, next)
    }
}

#[test]
fn losing_the_cursor_race_skips_without_error_or_duplicate() {
    let inner = MemoryStore::new();
    let owner = Uuid::new_v4();
    let stored = RecurringStore::insert(
        &inner,
        definition(
            owner,
            Frequency::Monthly,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ),
    )
    .unwrap();

    // The other scheduler already claimed this cycle.
    let winner_time = utc(2024, 2, 1);
    let stored_id = stored.id;
    inner.advance(stored_id, owner, None, winner_time).unwrap();

    // Our scheduler still holds the pre-race snapshot.
    let store = StaleRecurringStore {
        stale: vec![stored],
        inner,
    };
    let transactions = MemoryStore::new();
    let processed =
        RecurrenceScheduler::process_due(&store, &transactions, owner, utc(2024, 2, 1)).unwrap();
    assert_eq!(processed, 0);
    assert!(
        TransactionStore::list(&transactions, owner, &TransactionQuery::default())
            .unwrap()
            .is_empty()
    );

    // A direct conflicting advance reports the conflict explicitly.
    let err = store
        .advance(stored_id, owner, None, winner_time)
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}
