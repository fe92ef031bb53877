//! Project entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A hosted static-site project.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    /// Unique project identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// The user who created the project.
    pub owner_id: Uuid,
    /// Delegated project manager, if assigned.
    pub manager_id: Option<Uuid>,
    /// The currently published version, if any. When set, it must
    /// reference a version belonging to this project.
    pub current_version_id: Option<Uuid>,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
    /// When the project was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Check whether the given user owns or manages this project.
    pub fn is_owned_or_managed_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id || self.manager_id == Some(user_id)
    }
}

/// Data required to create a new project record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// The creating user.
    pub owner_id: Uuid,
}
