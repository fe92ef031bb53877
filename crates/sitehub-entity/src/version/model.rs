//! Site version entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One uploaded rendition of a project's static site.
///
/// The extracted content lives under
/// `{site_root}/projects/{project_id}/{label}`; `file_path` stores that
/// suffix redundantly so the row is self-describing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SiteVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The owning project.
    pub project_id: Uuid,
    /// Human-readable version label. Not unique per project; the upload
    /// pipeline rejects labels whose directory is still occupied.
    pub label: String,
    /// Storage path relative to the site root.
    pub file_path: String,
    /// Size of the uploaded archive in bytes.
    pub size_bytes: i64,
    /// The user who uploaded this version.
    pub uploaded_by: Option<Uuid>,
    /// Whether this is the project's published version. At most one
    /// version per project is active at any time.
    pub is_active: bool,
    /// Opaque token granting unauthenticated preview access.
    pub share_code: Option<String>,
    /// When the version was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new version record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVersion {
    /// The owning project.
    pub project_id: Uuid,
    /// Human-readable version label.
    pub label: String,
    /// Storage path relative to the site root.
    pub file_path: String,
    /// Size of the uploaded archive in bytes.
    pub size_bytes: i64,
    /// The uploading user.
    pub uploaded_by: Option<Uuid>,
    /// Preview share token.
    pub share_code: Option<String>,
}
