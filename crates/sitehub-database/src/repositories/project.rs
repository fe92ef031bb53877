//! Project repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sitehub_core::error::{AppError, ErrorKind};
use sitehub_core::result::AppResult;
use sitehub_entity::project::{CreateProject, Project};
use sitehub_entity::store::ProjectStore;

/// Repository for project CRUD and query operations.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// Create a new project repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn create(&self, data: &CreateProject) -> AppResult<Project> {
        sqlx::query_as::<_, Project>(
            "INSERT INTO projects (name, description, owner_id) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create project", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find project", e))
    }

    async fn list_all(&self) -> AppResult<Vec<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list projects", e))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list projects", e))
    }

    async fn update(&self, project: &Project) -> AppResult<Project> {
        sqlx::query_as::<_, Project>(
            "UPDATE projects SET name = $2, description = $3, manager_id = $4, \
             current_version_id = $5, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.manager_id)
        .bind(project.current_version_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update project", e))?
        .ok_or_else(|| AppError::not_found(format!("Project {} not found", project.id)))
    }

    async fn set_current_version(
        &self,
        project_id: Uuid,
        version_id: Option<Uuid>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE projects SET current_version_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(project_id)
        .bind(version_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update current version", e)
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete project", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
