//! Domain types representing owner-scoped spending categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::EntryKind;

pub const DEFAULT_COLOR: &str = "#3b82f6";
pub const DEFAULT_ICON: &str = "DollarSign";

/// Categorises ledger activity for budgeting and reporting.
///
/// Uniqueness is enforced per (owner, lowercased name, kind). Transactions
/// reference categories by name only, so deleting a category leaves any
/// entries carrying its label untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub kind: EntryKind,
    pub color: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(owner_id: Uuid, name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            kind,
            color: DEFAULT_COLOR.into(),
            icon: DEFAULT_ICON.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_appearance(mut self, color: impl Into<String>, icon: impl Into<String>) -> Self {
        self.color = color.into();
        self.icon = icon.into();
        self
    }

    /// Case-insensitive identity used for duplicate checks.
    pub fn matches_name(&self, candidate: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(candidate.trim())
    }
}

/// Changes applied to an existing category. The kind is fixed at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl CategoryPatch {
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(name) = &self.name {
            category.name = name.clone();
        }
        if let Some(color) = &self.color {
            category.color = color.clone();
        }
        if let Some(icon) = &self.icon {
            category.icon = icon.clone();
        }
    }
}
