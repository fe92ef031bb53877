//! Project CRUD and permission grants.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use sitehub_core::error::AppError;
use sitehub_core::result::AppResult;
use sitehub_entity::permission::{PermissionLevel, ProjectPermission};
use sitehub_entity::project::{CreateProject, Project};
use sitehub_entity::store::{PermissionStore, ProjectStore, UserStore};

use crate::access::require_project_read;
use crate::context::RequestContext;

/// Request to create a new project.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateProjectRequest {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
}

/// Request to update an existing project.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateProjectRequest {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New delegated manager (admin only; `Some(None)` clears it).
    pub manager_id: Option<Option<Uuid>>,
}

/// Manages project lifecycle and per-user grants.
pub struct ProjectService {
    /// Project store.
    projects: Arc<dyn ProjectStore>,
    /// User store (manager/grant target validation).
    users: Arc<dyn UserStore>,
    /// Permission store.
    permissions: Arc<dyn PermissionStore>,
}

impl std::fmt::Debug for ProjectService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectService").finish()
    }
}

impl ProjectService {
    /// Creates a new project service.
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        users: Arc<dyn UserStore>,
        permissions: Arc<dyn PermissionStore>,
    ) -> Self {
        Self {
            projects,
            users,
            permissions,
        }
    }

    /// Creates a project owned by the caller.
    pub async fn create_project(
        &self,
        ctx: &RequestContext,
        req: CreateProjectRequest,
    ) -> AppResult<Project> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Project name must not be empty"));
        }

        let project = self
            .projects
            .create(&CreateProject {
                name: req.name,
                description: req.description,
                owner_id: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %project.id,
            name = %project.name,
            "Project created"
        );
        Ok(project)
    }

    /// Fetches a project the caller can read.
    pub async fn get_project(&self, ctx: &RequestContext, project_id: Uuid) -> AppResult<Project> {
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))?;

        require_project_read(ctx, &project, &*self.permissions).await?;
        Ok(project)
    }

    /// Lists projects: admins see everything, others their own.
    pub async fn list_projects(&self, ctx: &RequestContext) -> AppResult<Vec<Project>> {
        if ctx.is_admin() {
            self.projects.list_all().await
        } else {
            self.projects.list_by_owner(ctx.user_id).await
        }
    }

    /// Updates project details. Manager reassignment is admin-only.
    pub async fn update_project(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        req: UpdateProjectRequest,
    ) -> AppResult<Project> {
        let mut project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))?;

        if !ctx.is_admin() && !project.is_owned_or_managed_by(ctx.user_id) {
            return Err(AppError::forbidden(
                "You do not have permission to modify this project",
            ));
        }

        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Project name must not be empty"));
            }
            project.name = name;
        }
        if let Some(description) = req.description {
            project.description = Some(description);
        }
        if let Some(manager_id) = req.manager_id {
            if !ctx.is_admin() {
                return Err(AppError::forbidden(
                    "Only administrators can assign project managers",
                ));
            }
            if let Some(manager_id) = manager_id {
                self.users
                    .find_by_id(manager_id)
                    .await?
                    .ok_or_else(|| AppError::validation("Specified manager does not exist"))?;
            }
            project.manager_id = manager_id;
        }

        let project = self.projects.update(&project).await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %project.id,
            "Project updated"
        );
        Ok(project)
    }

    /// Deletes a project (admin only).
    pub async fn delete_project(&self, ctx: &RequestContext, project_id: Uuid) -> AppResult<()> {
        if !ctx.is_admin() {
            return Err(AppError::forbidden("Administrator privileges required"));
        }

        let deleted = self.projects.delete(project_id).await?;
        if !deleted {
            return Err(AppError::not_found("Project not found"));
        }

        info!(
            user_id = %ctx.user_id,
            project_id = %project_id,
            "Project deleted"
        );
        Ok(())
    }

    /// Grants or updates a user's permission on a project.
    pub async fn grant_permission(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        target_user_id: Uuid,
        level: PermissionLevel,
    ) -> AppResult<ProjectPermission> {
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))?;

        if !ctx.is_admin() && !project.is_owned_or_managed_by(ctx.user_id) {
            return Err(AppError::forbidden(
                "You do not have permission to manage grants on this project",
            ));
        }

        self.users
            .find_by_id(target_user_id)
            .await?
            .ok_or_else(|| AppError::validation("Target user does not exist"))?;

        let grant = self
            .permissions
            .upsert(project_id, target_user_id, level)
            .await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %project_id,
            target_user_id = %target_user_id,
            level = %level,
            "Permission granted"
        );
        Ok(grant)
    }
}
