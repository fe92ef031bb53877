//! Project permission entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Permission level a user can hold on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "permission_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Can view the project and its versions.
    Read,
    /// Can upload, activate, and delete versions.
    Write,
}

impl PermissionLevel {
    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = sitehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            _ => Err(sitehub_core::AppError::validation(format!(
                "Invalid permission level: '{s}'. Expected 'read' or 'write'"
            ))),
        }
    }
}

/// A per-user grant on a project, unique per (project, user) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectPermission {
    /// Unique grant identifier.
    pub id: Uuid,
    /// The project the grant applies to.
    pub project_id: Uuid,
    /// The user the grant applies to.
    pub user_id: Uuid,
    /// Granted level.
    pub level: PermissionLevel,
    /// When the grant was created.
    pub created_at: DateTime<Utc>,
    /// When the grant was last updated.
    pub updated_at: DateTime<Utc>,
}
