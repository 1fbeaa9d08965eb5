use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display preference stored with the profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        };
        f.write_str(label)
    }
}

/// Per-owner account record.
///
/// The credential is an opaque hash produced elsewhere; this crate stores it
/// verbatim and never interprets it. A zero budget means "unset".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub credential: String,
    #[serde(default)]
    pub budget_cents: i64,
    #[serde(default)]
    pub theme: Theme,
    pub created_at: DateTime<Utc>,
}

impl OwnerProfile {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            credential: credential.into(),
            budget_cents: 0,
            theme: Theme::default(),
            created_at: Utc::now(),
        }
    }

    pub fn has_budget(&self) -> bool {
        self.budget_cents > 0
    }
}

/// Changes applied to an existing profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl ProfilePatch {
    pub fn apply_to(&self, profile: &mut OwnerProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(budget) = self.budget_cents {
            profile.budget_cents = budget;
        }
        if let Some(theme) = self.theme {
            profile.theme = theme;
        }
    }
}
