//! Store abstractions over the durable collections.
//!
//! The engines never touch persistence directly; every operation takes one
//! of these narrow handles. Both backends enforce owner scoping, so a record
//! is only ever visible to the owner that created it.

pub mod json_backend;
pub mod memory;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger::{
    Category, CategoryPatch, EntryKind, OwnerProfile, RecurringDefinition, RecurringPatch,
    Transaction, TransactionPatch, TransactionQuery,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// The owner's ledger of concrete income/expense entries.
pub trait TransactionStore: Send + Sync {
    /// Entries matching `query`, filtered, sorted, and paginated.
    fn list(&self, owner_id: Uuid, query: &TransactionQuery) -> Result<Vec<Transaction>>;
    /// Match count for `query`, ignoring pagination.
    fn count(&self, owner_id: Uuid, query: &TransactionQuery) -> Result<usize>;
    fn insert(&self, transaction: Transaction) -> Result<Transaction>;
    /// `None` when the entry does not exist in the owner's scope.
    fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>>;
    fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool>;
}

/// The owner's named category registry.
pub trait CategoryStore: Send + Sync {
    /// Categories sorted by name, optionally narrowed to one kind.
    fn list(&self, owner_id: Uuid, kind: Option<EntryKind>) -> Result<Vec<Category>>;
    fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Category>>;
    /// Existing category with the same (owner, name, kind) identity,
    /// ignoring case, excluding `exclude` when given.
    fn find_duplicate(
        &self,
        owner_id: Uuid,
        name: &str,
        kind: EntryKind,
        exclude: Option<Uuid>,
    ) -> Result<Option<Category>>;
    fn insert(&self, category: Category) -> Result<Category>;
    fn update(&self, id: Uuid, owner_id: Uuid, patch: &CategoryPatch) -> Result<Option<Category>>;
    fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool>;
}

/// Recurring definitions plus the scheduler's cursor primitive.
pub trait RecurringStore: Send + Sync {
    /// All of the owner's definitions, newest first.
    fn list(&self, owner_id: Uuid) -> Result<Vec<RecurringDefinition>>;
    /// Active definitions whose `[start, end]` window contains `as_of`.
    fn list_active(&self, owner_id: Uuid, as_of: NaiveDate) -> Result<Vec<RecurringDefinition>>;
    fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Option<RecurringDefinition>>;
    fn insert(&self, definition: RecurringDefinition) -> Result<RecurringDefinition>;
    fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &RecurringPatch,
    ) -> Result<Option<RecurringDefinition>>;
    fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool>;
    /// Conditional cursor advance keyed on the previously observed value.
    ///
    /// Fails with [`CoreError::Conflict`] when the stored cursor no longer
    /// equals `expected`, which means another caller claimed this cycle.
    fn advance(
        &self,
        id: Uuid,
        owner_id: Uuid,
        expected: Option<DateTime<Utc>>,
        next: DateTime<Utc>,
    ) -> Result<()>;
}

/// Owner account records; the budget figure feeds the evaluator.
pub trait ProfileStore: Send + Sync {
    fn get(&self, owner_id: Uuid) -> Result<Option<OwnerProfile>>;
    fn find_by_email(&self, email: &str) -> Result<Option<OwnerProfile>>;
    fn upsert(&self, profile: OwnerProfile) -> Result<OwnerProfile>;
    /// The owner's monthly budget in cents; zero when unset or missing.
    fn budget_cents(&self, owner_id: Uuid) -> Result<i64>;
}

pub use json_backend::JsonStore;
pub use memory::MemoryStore;
