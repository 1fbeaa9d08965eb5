//! In-memory backend, also the shared record-collection logic reused by the
//! JSON-file backend.

use std::sync::RwLock;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger::{
    Category, CategoryPatch, EntryKind, OwnerProfile, RecurringDefinition, RecurringPatch,
    Transaction, TransactionPatch, TransactionQuery,
};

use super::{CategoryStore, ProfileStore, RecurringStore, Result, TransactionStore};

/// Every record collection in one place. Backends wrap this in a lock; all
/// operations are owner-scoped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Collections {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub recurring: Vec<RecurringDefinition>,
    #[serde(default)]
    pub profiles: Vec<OwnerProfile>,
}

impl Collections {
    pub fn list_transactions(
        &self,
        owner_id: Uuid,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        let owned: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|txn| txn.owner_id == owner_id)
            .cloned()
            .collect();
        query.apply(&owned)
    }

    pub fn count_transactions(&self, owner_id: Uuid, query: &TransactionQuery) -> usize {
        self.transactions
            .iter()
            .filter(|txn| txn.owner_id == owner_id && query.matches(txn))
            .count()
    }

    pub fn insert_transaction(&mut self, transaction: Transaction) -> Transaction {
        self.transactions.push(transaction.clone());
        transaction
    }

    pub fn update_transaction(
        &mut self,
        id: Uuid,
        owner_id: Uuid,
        patch: &TransactionPatch,
    ) -> Option<Transaction> {
        let transaction = self
            .transactions
            .iter_mut()
            .find(|txn| txn.id == id && txn.owner_id == owner_id)?;
        patch.apply_to(transaction);
        Some(transaction.clone())
    }

    pub fn delete_transaction(&mut self, id: Uuid, owner_id: Uuid) -> bool {
        let before = self.transactions.len();
        self.transactions
            .retain(|txn| !(txn.id == id && txn.owner_id == owner_id));
        self.transactions.len() != before
    }

    pub fn list_categories(&self, owner_id: Uuid, kind: Option<EntryKind>) -> Vec<Category> {
        let mut categories: Vec<Category> = self
            .categories
            .iter()
            .filter(|category| {
                category.owner_id == owner_id && kind.map_or(true, |k| category.kind == k)
            })
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }

    pub fn get_category(&self, id: Uuid, owner_id: Uuid) -> Option<Category> {
        self.categories
            .iter()
            .find(|category| category.id == id && category.owner_id == owner_id)
            .cloned()
    }

    pub fn find_duplicate_category(
        &self,
        owner_id: Uuid,
        name: &str,
        kind: EntryKind,
        exclude: Option<Uuid>,
    ) -> Option<Category> {
        self.categories
            .iter()
            .find(|category| {
                category.owner_id == owner_id
                    && category.kind == kind
                    && category.matches_name(name)
                    && exclude.map_or(true, |id| category.id != id)
            })
            .cloned()
    }

    pub fn insert_category(&mut self, category: Category) -> Category {
        self.categories.push(category.clone());
        category
    }

    pub fn update_category(
        &mut self,
        id: Uuid,
        owner_id: Uuid,
        patch: &CategoryPatch,
    ) -> Option<Category> {
        let category = self
            .categories
            .iter_mut()
            .find(|category| category.id == id && category.owner_id == owner_id)?;
        patch.apply_to(category);
        Some(category.clone())
    }

    pub fn delete_category(&mut self, id: Uuid, owner_id: Uuid) -> bool {
        let before = self.categories.len();
        self.categories
            .retain(|category| !(category.id == id && category.owner_id == owner_id));
        self.categories.len() != before
    }

    pub fn list_recurring(&self, owner_id: Uuid) -> Vec<RecurringDefinition> {
        let mut definitions: Vec<RecurringDefinition> = self
            .recurring
            .iter()
            .filter(|definition| definition.owner_id == owner_id)
            .cloned()
            .collect();
        definitions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        definitions
    }

    pub fn list_active_recurring(
        &self,
        owner_id: Uuid,
        as_of: NaiveDate,
    ) -> Vec<RecurringDefinition> {
        self.recurring
            .iter()
            .filter(|definition| {
                definition.owner_id == owner_id && definition.active && definition.in_window(as_of)
            })
            .cloned()
            .collect()
    }

    pub fn get_recurring(&self, id: Uuid, owner_id: Uuid) -> Option<RecurringDefinition> {
        self.recurring
            .iter()
            .find(|definition| definition.id == id && definition.owner_id == owner_id)
            .cloned()
    }

    pub fn insert_recurring(&mut self, definition: RecurringDefinition) -> RecurringDefinition {
        self.recurring.push(definition.clone());
        definition
    }

    pub fn update_recurring(
        &mut self,
        id: Uuid,
        owner_id: Uuid,
        patch: &RecurringPatch,
    ) -> Option<RecurringDefinition> {
        let definition = self
            .recurring
            .iter_mut()
            .find(|definition| definition.id == id && definition.owner_id == owner_id)?;
        patch.apply_to(definition);
        Some(definition.clone())
    }

    pub fn delete_recurring(&mut self, id: Uuid, owner_id: Uuid) -> bool {
        let before = self.recurring.len();
        self.recurring
            .retain(|definition| !(definition.id == id && definition.owner_id == owner_id));
        self.recurring.len() != before
    }

    pub fn advance_recurring(
        &mut self,
        id: Uuid,
        owner_id: Uuid,
        expected: Option<DateTime<Utc>>,
        next: DateTime<Utc>,
    ) -> Result<()> {
        let definition = self
            .recurring
            .iter_mut()
            .find(|definition| definition.id == id && definition.owner_id == owner_id)
            .ok_or_else(|| CoreError::NotFound("recurring definition".into()))?;
        if definition.last_materialized_at != expected {
            return Err(CoreError::Conflict(format!(
                "materialization cursor for {id} has moved"
            )));
        }
        definition.last_materialized_at = Some(next);
        Ok(())
    }

    pub fn get_profile(&self, owner_id: Uuid) -> Option<OwnerProfile> {
        self.profiles
            .iter()
            .find(|profile| profile.id == owner_id)
            .cloned()
    }

    pub fn find_profile_by_email(&self, email: &str) -> Option<OwnerProfile> {
        self.profiles
            .iter()
            .find(|profile| profile.email.eq_ignore_ascii_case(email.trim()))
            .cloned()
    }

    pub fn upsert_profile(&mut self, profile: OwnerProfile) -> OwnerProfile {
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile.clone(),
            None => self.profiles.push(profile.clone()),
        }
        profile
    }
}

/// Reference backend holding everything behind one `RwLock`. Used by tests
/// and by callers embedding the core without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>> {
        self.inner
            .read()
            .map_err(|_| CoreError::StorageUnavailable("store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>> {
        self.inner
            .write()
            .map_err(|_| CoreError::StorageUnavailable("store lock poisoned".into()))
    }
}

impl TransactionStore for MemoryStore {
    fn list(&self, owner_id: Uuid, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        self.read()?.list_transactions(owner_id, query)
    }

    fn count(&self, owner_id: Uuid, query: &TransactionQuery) -> Result<usize> {
        Ok(self.read()?.count_transactions(owner_id, query))
    }

    fn insert(&self, transaction: Transaction) -> Result<Transaction> {
        Ok(self.write()?.insert_transaction(transaction))
    }

    fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>> {
        Ok(self.write()?.update_transaction(id, owner_id, patch))
    }

    fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        Ok(self.write()?.delete_transaction(id, owner_id))
    }
}

impl CategoryStore for MemoryStore {
    fn list(&self, owner_id: Uuid, kind: Option<EntryKind>) -> Result<Vec<Category>> {
        Ok(self.read()?.list_categories(owner_id, kind))
    }

    fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Category>> {
        Ok(self.read()?.get_category(id, owner_id))
    }

    fn find_duplicate(
        &self,
        owner_id: Uuid,
        name: &str,
        kind: EntryKind,
        exclude: Option<Uuid>,
    ) -> Result<Option<Category>> {
        Ok(self
            .read()?
            .find_duplicate_category(owner_id, name, kind, exclude))
    }

    fn insert(&self, category: Category) -> Result<Category> {
        Ok(self.write()?.insert_category(category))
    }

    fn update(&self, id: Uuid, owner_id: Uuid, patch: &CategoryPatch) -> Result<Option<Category>> {
        Ok(self.write()?.update_category(id, owner_id, patch))
    }

    fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        Ok(self.write()?.delete_category(id, owner_id))
    }
}

impl RecurringStore for MemoryStore {
    fn list(&self, owner_id: Uuid) -> Result<Vec<RecurringDefinition>> {
        Ok(self.read()?.list_recurring(owner_id))
    }

    fn list_active(&self, owner_id: Uuid, as_of: NaiveDate) -> Result<Vec<RecurringDefinition>> {
        Ok(self.read()?.list_active_recurring(owner_id, as_of))
    }

    fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Option<RecurringDefinition>> {
        Ok(self.read()?.get_recurring(id, owner_id))
    }

    fn insert(&self, definition: RecurringDefinition) -> Result<RecurringDefinition> {
        Ok(self.write()?.insert_recurring(definition))
    }

    fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &RecurringPatch,
    ) -> Result<Option<RecurringDefinition>> {
        Ok(self.write()?.update_recurring(id, owner_id, patch))
    }

    fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        Ok(self.write()?.delete_recurring(id, owner_id))
    }

    fn advance(
        &self,
        id: Uuid,
        owner_id: Uuid,
        expected: Option<DateTime<Utc>>,
        next: DateTime<Utc>,
    ) -> Result<()> {
        self.write()?.advance_recurring(id, owner_id, expected, next)
    }
}

impl ProfileStore for MemoryStore {
    fn get(&self, owner_id: Uuid) -> Result<Option<OwnerProfile>> {
        Ok(self.read()?.get_profile(owner_id))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<OwnerProfile>> {
        Ok(self.read()?.find_profile_by_email(email))
    }

    fn upsert(&self, profile: OwnerProfile) -> Result<OwnerProfile> {
        Ok(self.write()?.upsert_profile(profile))
    }

    fn budget_cents(&self, owner_id: Uuid) -> Result<i64> {
        Ok(self
            .read()?
            .get_profile(owner_id)
            .map(|profile| profile.budget_cents)
            .unwrap_or(0))
    }
}
