use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger::{Category, CategoryPatch, EntryKind};
use crate::storage::CategoryStore;

use super::{validate_color, validate_label, ServiceResult};

pub struct CategoryService;

impl CategoryService {
    /// Creates a category, rejecting duplicates within (owner, name, kind).
    pub fn add(
        store: &dyn CategoryStore,
        owner_id: Uuid,
        name: &str,
        kind: EntryKind,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> ServiceResult<Category> {
        let name = validate_label("category name", name)?;
        if store.find_duplicate(owner_id, &name, kind, None)?.is_some() {
            return Err(CoreError::InvalidInput(format!(
                "category `{name}` already exists"
            )));
        }
        let mut category = Category::new(owner_id, name, kind);
        if let Some(color) = color {
            category.color = validate_color(color)?;
        }
        if let Some(icon) = icon {
            category.icon = validate_label("icon", icon)?;
        }
        store.insert(category)
    }

    /// Renames or restyles a category; the kind is fixed at creation.
    pub fn edit(
        store: &dyn CategoryStore,
        id: Uuid,
        owner_id: Uuid,
        mut patch: CategoryPatch,
    ) -> ServiceResult<Category> {
        let existing = store
            .get(id, owner_id)?
            .ok_or_else(|| CoreError::NotFound("category".into()))?;
        if let Some(name) = &patch.name {
            let name = validate_label("category name", name)?;
            if store
                .find_duplicate(owner_id, &name, existing.kind, Some(id))?
                .is_some()
            {
                return Err(CoreError::InvalidInput(format!(
                    "category `{name}` already exists"
                )));
            }
            patch.name = Some(name);
        }
        if let Some(color) = &patch.color {
            patch.color = Some(validate_color(color)?);
        }
        if let Some(icon) = &patch.icon {
            patch.icon = Some(validate_label("icon", icon)?);
        }
        store
            .update(id, owner_id, &patch)?
            .ok_or_else(|| CoreError::NotFound("category".into()))
    }

    /// Removes the category. Transactions keep any label that referenced it.
    pub fn remove(store: &dyn CategoryStore, id: Uuid, owner_id: Uuid) -> ServiceResult<()> {
        if store.delete(id, owner_id)? {
            Ok(())
        } else {
            Err(CoreError::NotFound("category".into()))
        }
    }

    pub fn list(
        store: &dyn CategoryStore,
        owner_id: Uuid,
        kind: Option<EntryKind>,
    ) -> ServiceResult<Vec<Category>> {
        store.list(owner_id, kind)
    }
}
