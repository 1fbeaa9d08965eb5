use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger::{OwnerProfile, ProfilePatch};
use crate::storage::ProfileStore;

use super::{validate_label, ServiceResult};

pub struct ProfileService;

impl ProfileService {
    /// Creates an owner record. The credential arrives pre-hashed; this
    /// crate stores it opaquely.
    pub fn create(
        store: &dyn ProfileStore,
        name: &str,
        email: &str,
        credential: &str,
    ) -> ServiceResult<OwnerProfile> {
        let name = validate_label("name", name)?;
        let email = validate_email(email)?;
        if store.find_by_email(&email)?.is_some() {
            return Err(CoreError::InvalidInput("email already in use".into()));
        }
        store.upsert(OwnerProfile::new(name, email, credential))
    }

    pub fn get(store: &dyn ProfileStore, owner_id: Uuid) -> ServiceResult<OwnerProfile> {
        store
            .get(owner_id)?
            .ok_or_else(|| CoreError::NotFound("profile".into()))
    }

    /// Updates profile fields, keeping the email unique across owners.
    pub fn update(
        store: &dyn ProfileStore,
        owner_id: Uuid,
        mut patch: ProfilePatch,
    ) -> ServiceResult<OwnerProfile> {
        let mut profile = Self::get(store, owner_id)?;
        if let Some(name) = &patch.name {
            patch.name = Some(validate_label("name", name)?);
        }
        if let Some(email) = &patch.email {
            let email = validate_email(email)?;
            if let Some(existing) = store.find_by_email(&email)? {
                if existing.id != owner_id {
                    return Err(CoreError::InvalidInput("email already in use".into()));
                }
            }
            patch.email = Some(email);
        }
        if let Some(budget) = patch.budget_cents {
            if budget < 0 {
                return Err(CoreError::InvalidInput(
                    "budget must not be negative".into(),
                ));
            }
        }
        patch.apply_to(&mut profile);
        store.upsert(profile)
    }
}

fn validate_email(value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(CoreError::InvalidInput("a valid email is required".into()));
    }
    Ok(trimmed.to_string())
}
