use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::{EntryKind, Transaction};

/// Suffix appended to materialized descriptions so generated entries stay
/// recognizable in the ledger. The link back to the definition is by
/// convention only; no foreign key is stored.
pub const MATERIALIZED_MARKER: &str = "(Recurring)";

/// How often a recurring definition produces a ledger entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Whole-day gap that must elapse before the next materialization.
    ///
    /// Months and years are fixed 30- and 365-day approximations rather than
    /// calendar arithmetic; the resulting drift is part of the observable
    /// contract and changing it would alter every due date.
    pub fn threshold_days(self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
            Frequency::Yearly => 365,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };
        f.write_str(label)
    }
}

/// Template for transactions produced on a schedule.
///
/// The cursor (`last_materialized_at`) is advanced only by the scheduler,
/// through the store's conditional write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringDefinition {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: EntryKind,
    pub amount_cents: i64,
    pub category: String,
    pub description: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_materialized_at: Option<DateTime<Utc>>,
    #[serde(default = "RecurringDefinition::default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl RecurringDefinition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner_id: Uuid,
        kind: EntryKind,
        amount_cents: i64,
        category: impl Into<String>,
        description: impl Into<String>,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            amount_cents,
            category: category.into(),
            description: description.into(),
            frequency,
            start_date,
            end_date: None,
            last_materialized_at: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Whether `[start_date, end_date-or-open]` contains the given day.
    pub fn in_window(&self, on: NaiveDate) -> bool {
        self.start_date <= on && self.end_date.map_or(true, |end| end >= on)
    }

    /// Due when never materialized, or when the whole-day gap since the last
    /// materialization reaches the frequency threshold. At most one cycle is
    /// claimed per check; missed periods are not caught up.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_materialized_at {
            None => true,
            Some(last) => (now - last).num_days() >= self.frequency.threshold_days(),
        }
    }

    /// Builds the concrete ledger entry for the current cycle.
    pub fn materialize(&self, now: DateTime<Utc>) -> Transaction {
        Transaction::new(
            self.owner_id,
            self.kind,
            self.amount_cents,
            self.category.clone(),
            format!("{} {}", self.description, MATERIALIZED_MARKER),
            now.date_naive(),
        )
    }

    pub fn default_active() -> bool {
        true
    }
}

/// Changes applied to an existing definition. `end_date` is doubly optional
/// so callers can distinguish "leave as is" from "clear the end date".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecurringPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntryKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl RecurringPatch {
    pub fn apply_to(&self, definition: &mut RecurringDefinition) {
        if let Some(kind) = self.kind {
            definition.kind = kind;
        }
        if let Some(amount) = self.amount_cents {
            definition.amount_cents = amount;
        }
        if let Some(category) = &self.category {
            definition.category = category.clone();
        }
        if let Some(description) = &self.description {
            definition.description = description.clone();
        }
        if let Some(frequency) = self.frequency {
            definition.frequency = frequency;
        }
        if let Some(start_date) = self.start_date {
            definition.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            definition.end_date = end_date;
        }
        if let Some(active) = self.active {
            definition.active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn monthly_rent(start: NaiveDate) -> RecurringDefinition {
        RecurringDefinition::new(
            Uuid::new_v4(),
            EntryKind::Expense,
            120_000,
            "Rent",
            "Monthly rent",
            Frequency::Monthly,
            start,
        )
    }

    fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn never_materialized_is_due() {
        let definition = monthly_rent(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(definition.is_due(utc(2024, 2, 5)));
    }

    #[test]
    fn monthly_threshold_boundary() {
        let mut definition = monthly_rent(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let now = utc(2024, 3, 1);

        definition.last_materialized_at = Some(now - chrono::Duration::days(29));
        assert!(!definition.is_due(now));

        definition.last_materialized_at = Some(now - chrono::Duration::days(30));
        assert!(definition.is_due(now));
    }

    #[test]
    fn window_respects_open_and_closed_end() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let open = monthly_rent(start);
        assert!(open.in_window(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
        assert!(!open.in_window(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));

        let closed = monthly_rent(start).with_end_date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert!(closed.in_window(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()));
        assert!(!closed.in_window(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()));
    }

    #[test]
    fn materialized_entry_copies_template_and_tags_description() {
        let definition = monthly_rent(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let now = utc(2024, 2, 5);
        let entry = definition.materialize(now);

        assert_eq!(entry.owner_id, definition.owner_id);
        assert_eq!(entry.kind, EntryKind::Expense);
        assert_eq!(entry.amount_cents, 120_000);
        assert_eq!(entry.category, "Rent");
        assert_eq!(entry.description, "Monthly rent (Recurring)");
        assert_eq!(entry.occurred_on, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
    }

    #[test]
    fn frequency_thresholds_are_fixed_day_counts() {
        assert_eq!(Frequency::Daily.threshold_days(), 1);
        assert_eq!(Frequency::Weekly.threshold_days(), 7);
        assert_eq!(Frequency::Monthly.threshold_days(), 30);
        assert_eq!(Frequency::Yearly.threshold_days(), 365);
    }
}
