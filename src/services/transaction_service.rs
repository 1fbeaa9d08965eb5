//! Business logic helpers for managing ledger entries.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger::{
    EntryKind, Transaction, TransactionPage, TransactionPatch, TransactionQuery,
};
use crate::storage::TransactionStore;

use super::{validate_amount, validate_label, ServiceResult};

/// Provides validated CRUD helpers for ledger entries.
pub struct TransactionService;

impl TransactionService {
    /// Validates and records a new entry.
    pub fn add(
        store: &dyn TransactionStore,
        owner_id: Uuid,
        kind: EntryKind,
        amount_cents: i64,
        category: &str,
        description: &str,
        occurred_on: NaiveDate,
    ) -> ServiceResult<Transaction> {
        validate_amount(amount_cents)?;
        let category = validate_label("category", category)?;
        let description = validate_label("description", description)?;
        let transaction = Transaction::new(
            owner_id,
            kind,
            amount_cents,
            category,
            description,
            occurred_on,
        );
        store.insert(transaction)
    }

    /// Applies a patch to the owner's entry, rejecting invalid fields first.
    pub fn update(
        store: &dyn TransactionStore,
        id: Uuid,
        owner_id: Uuid,
        mut patch: TransactionPatch,
    ) -> ServiceResult<Transaction> {
        if let Some(amount) = patch.amount_cents {
            validate_amount(amount)?;
        }
        if let Some(category) = &patch.category {
            patch.category = Some(validate_label("category", category)?);
        }
        if let Some(description) = &patch.description {
            patch.description = Some(validate_label("description", description)?);
        }
        store
            .update(id, owner_id, &patch)?
            .ok_or_else(|| CoreError::NotFound("transaction".into()))
    }

    pub fn remove(store: &dyn TransactionStore, id: Uuid, owner_id: Uuid) -> ServiceResult<()> {
        if store.delete(id, owner_id)? {
            Ok(())
        } else {
            Err(CoreError::NotFound("transaction".into()))
        }
    }

    /// Runs a listing query and wraps the slice with pagination bookkeeping.
    pub fn search(
        store: &dyn TransactionStore,
        owner_id: Uuid,
        query: &TransactionQuery,
    ) -> ServiceResult<TransactionPage> {
        let transactions = store.list(owner_id, query)?;
        let total = store.count(owner_id, query)?;
        Ok(TransactionPage::new(
            transactions,
            query.page.unwrap_or(1),
            query.page_size(),
            total,
        ))
    }
}
