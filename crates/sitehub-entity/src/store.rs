//! Persistence-port traits for SiteHub entities.
//!
//! The service layer depends only on these traits; `sitehub-database`
//! supplies the PostgreSQL implementations and tests substitute in-memory
//! ones. Entity-specific query methods are defined here rather than on a
//! generic CRUD trait because each entity's access patterns differ.

use async_trait::async_trait;
use uuid::Uuid;

use sitehub_core::result::AppResult;

use crate::permission::{PermissionLevel, ProjectPermission};
use crate::project::{CreateProject, Project};
use crate::user::{CreateUser, User, UserRole};
use crate::version::{CreateVersion, SiteVersion};

/// Persistence operations for [`User`] records.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Create a new user. Fails with a conflict if the username is taken.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// List all users.
    async fn list_all(&self) -> AppResult<Vec<User>>;

    /// Update a user's role.
    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User>;
}

/// Persistence operations for [`Project`] records.
#[async_trait]
pub trait ProjectStore: Send + Sync + 'static {
    /// Create a new project.
    async fn create(&self, data: &CreateProject) -> AppResult<Project>;

    /// Find a project by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Project>>;

    /// List every project on the platform.
    async fn list_all(&self) -> AppResult<Vec<Project>>;

    /// List projects owned by the given user.
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Project>>;

    /// Update a project record (full row).
    async fn update(&self, project: &Project) -> AppResult<Project>;

    /// Point the project at a new published version (or clear it).
    async fn set_current_version(
        &self,
        project_id: Uuid,
        version_id: Option<Uuid>,
    ) -> AppResult<()>;

    /// Delete a project. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Persistence operations for [`SiteVersion`] records.
#[async_trait]
pub trait VersionStore: Send + Sync + 'static {
    /// Create a new version record.
    async fn create(&self, data: &CreateVersion) -> AppResult<SiteVersion>;

    /// Find a version by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SiteVersion>>;

    /// Find a version by its share code. Backed by a unique index since
    /// this serves the unauthenticated preview path.
    async fn find_by_share_code(&self, share_code: &str) -> AppResult<Option<SiteVersion>>;

    /// List a project's versions, newest first.
    async fn list_by_project(&self, project_id: Uuid) -> AppResult<Vec<SiteVersion>>;

    /// Clear the active flag on every version of a project. Returns the
    /// number of rows touched.
    async fn deactivate_all_for_project(&self, project_id: Uuid) -> AppResult<u64>;

    /// Mark a single version active.
    async fn set_active(&self, version_id: Uuid) -> AppResult<SiteVersion>;

    /// Count active versions for a project.
    async fn count_active_for_project(&self, project_id: Uuid) -> AppResult<i64>;

    /// Delete a version. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Persistence operations for [`ProjectPermission`] grants.
#[async_trait]
pub trait PermissionStore: Send + Sync + 'static {
    /// Look up a user's grant on a project.
    async fn find(&self, project_id: Uuid, user_id: Uuid)
        -> AppResult<Option<ProjectPermission>>;

    /// Create or update a grant for the (project, user) pair.
    async fn upsert(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        level: PermissionLevel,
    ) -> AppResult<ProjectPermission>;

    /// List all grants on a project.
    async fn list_for_project(&self, project_id: Uuid) -> AppResult<Vec<ProjectPermission>>;

    /// Remove a grant. Returns `true` if a row was removed.
    async fn delete(&self, project_id: Uuid, user_id: Uuid) -> AppResult<bool>;
}
