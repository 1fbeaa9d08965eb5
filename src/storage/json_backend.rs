//! Durable JSON-file backend with atomic writes.
//!
//! The whole data set lives in one snapshot file. It is loaded eagerly when
//! the store opens and rewritten through a temp-file rename on every
//! mutation, so a crash mid-write never leaves a torn snapshot behind.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::RwLock,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger::{
    Category, CategoryPatch, EntryKind, OwnerProfile, RecurringDefinition, RecurringPatch,
    Transaction, TransactionPatch, TransactionQuery,
};

use super::memory::Collections;
use super::{CategoryStore, ProfileStore, RecurringStore, Result, TransactionStore};

const SNAPSHOT_FILE: &str = "fintrack.json";
const TMP_SUFFIX: &str = "tmp";
const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default = "Snapshot::schema_version_default")]
    schema_version: u8,
    #[serde(flatten)]
    collections: Collections,
}

impl Snapshot {
    fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

/// File-backed store keeping the working set in memory and persisting every
/// mutation atomically.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    state: RwLock<Collections>,
}

impl JsonStore {
    /// Opens (or creates) the snapshot under `root`, falling back to the
    /// platform data directory when no root is given.
    pub fn open(root: Option<PathBuf>) -> Result<Self> {
        let base = resolve_base(root);
        ensure_dir(&base)?;
        let path = base.join(SNAPSHOT_FILE);
        let state = if path.exists() {
            let data = fs::read_to_string(&path)?;
            let snapshot: Snapshot = serde_json::from_str(&data)?;
            if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
                return Err(CoreError::StorageUnavailable(format!(
                    "snapshot schema v{} is newer than supported v{}",
                    snapshot.schema_version, CURRENT_SCHEMA_VERSION
                )));
            }
            snapshot.collections
        } else {
            Collections::default()
        };
        tracing::debug!(path = %path.display(), "opened ledger snapshot");
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>> {
        self.state
            .read()
            .map_err(|_| CoreError::StorageUnavailable("store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>> {
        self.state
            .write()
            .map_err(|_| CoreError::StorageUnavailable("store lock poisoned".into()))
    }

    fn persist(&self, state: &Collections) -> Result<()> {
        let snapshot = Snapshot {
            schema_version: CURRENT_SCHEMA_VERSION,
            collections: state.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        write_atomic(&self.path, &json)
    }
}

fn resolve_base(root: Option<PathBuf>) -> PathBuf {
    root.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fintrack")
    })
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(contents.as_bytes())?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

impl TransactionStore for JsonStore {
    fn list(&self, owner_id: Uuid, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        self.read()?.list_transactions(owner_id, query)
    }

    fn count(&self, owner_id: Uuid, query: &TransactionQuery) -> Result<usize> {
        Ok(self.read()?.count_transactions(owner_id, query))
    }

    fn insert(&self, transaction: Transaction) -> Result<Transaction> {
        let mut state = self.write()?;
        let inserted = state.insert_transaction(transaction);
        self.persist(&state)?;
        Ok(inserted)
    }

    fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>> {
        let mut state = self.write()?;
        let updated = state.update_transaction(id, owner_id, patch);
        if updated.is_some() {
            self.persist(&state)?;
        }
        Ok(updated)
    }

    fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        let mut state = self.write()?;
        let removed = state.delete_transaction(id, owner_id);
        if removed {
            self.persist(&state)?;
        }
        Ok(removed)
    }
}

impl CategoryStore for JsonStore {
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
        let mut state = self.write()?;
        let inserted = state.insert_category(category);
        self.persist(&state)?;
        Ok(inserted)
    }

    fn update(&self, id: Uuid, owner_id: Uuid, patch: &CategoryPatch) -> Result<Option<Category>> {
        let mut state = self.write()?;
        let updated = state.update_category(id, owner_id, patch);
        if updated.is_some() {
            self.persist(&state)?;
        }
        Ok(updated)
    }

    fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        let mut state = self.write()?;
        let removed = state.delete_category(id, owner_id);
        if removed {
            self.persist(&state)?;
        }
        Ok(removed)
    }
}

impl RecurringStore for JsonStore {
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
        let mut state = self.write()?;
        let inserted = state.insert_recurring(definition);
        self.persist(&state)?;
        Ok(inserted)
    }

    fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &RecurringPatch,
    ) -> Result<Option<RecurringDefinition>> {
        let mut state = self.write()?;
        let updated = state.update_recurring(id, owner_id, patch);
        if updated.is_some() {
            self.persist(&state)?;
        }
        Ok(updated)
    }

    fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        let mut state = self.write()?;
        let removed = state.delete_recurring(id, owner_id);
        if removed {
            self.persist(&state)?;
        }
        Ok(removed)
    }

    fn advance(
        &self,
        id: Uuid,
        owner_id: Uuid,
        expected: Option<DateTime<Utc>>,
        next: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.write()?;
        state.advance_recurring(id, owner_id, expected, next)?;
        self.persist(&state)
    }
}

impl ProfileStore for JsonStore {
    fn get(&self, owner_id: Uuid) -> Result<Option<OwnerProfile>> {
        Ok(self.read()?.get_profile(owner_id))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<OwnerProfile>> {
        Ok(self.read()?.find_profile_by_email(email))
    }

    fn upsert(&self, profile: OwnerProfile) -> Result<OwnerProfile> {
        let mut state = self.write()?;
        let stored = state.upsert_profile(profile);
        self.persist(&state)?;
        Ok(stored)
    }

    fn budget_cents(&self, owner_id: Uuid) -> Result<i64> {
        Ok(self
            .read()?
            .get_profile(owner_id)
            .map(|profile| profile.budget_cents)
            .unwrap_or(0))
    }
}
