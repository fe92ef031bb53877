//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sitehub_entity::user::User;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// User summary for responses (never exposes the password hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Email.
    pub email: Option<String>,
    /// Role.
    pub role: String,
    /// Created at.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.to_string(),
            created_at: user.created_at,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// Token expiration.
    pub expires_at: DateTime<Utc>,
    /// User info.
    pub user: UserResponse,
}

/// Successful upload response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// The new version's identifier.
    pub version_id: Uuid,
    /// Public static path of the version.
    pub static_url: String,
}

/// Share link metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareInfoResponse {
    /// Version label.
    pub version: String,
    /// When the version was created.
    pub created_at: DateTime<Utc>,
    /// Archive size in bytes.
    pub file_size: i64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Database status.
    pub database: String,
}
