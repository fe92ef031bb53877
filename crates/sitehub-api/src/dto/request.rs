//! Request DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sitehub_entity::permission::PermissionLevel;
use sitehub_entity::user::UserRole;

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Permission grant payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantPermissionRequest {
    /// The user receiving the grant.
    pub user_id: Uuid,
    /// Granted level.
    #[serde(default = "default_level")]
    pub level: PermissionLevel,
}

/// Role update payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    /// The new role.
    pub role: UserRole,
}

fn default_level() -> PermissionLevel {
    PermissionLevel::Read
}
