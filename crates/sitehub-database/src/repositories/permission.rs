//! Project permission repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sitehub_core::error::{AppError, ErrorKind};
use sitehub_core::result::AppResult;
use sitehub_entity::permission::{PermissionLevel, ProjectPermission};
use sitehub_entity::store::PermissionStore;

/// Repository for project permission grants.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionStore for PermissionRepository {
    async fn find(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<ProjectPermission>> {
        sqlx::query_as::<_, ProjectPermission>(
            "SELECT * FROM project_permissions WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find permission", e))
    }

    async fn upsert(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        level: PermissionLevel,
    ) -> AppResult<ProjectPermission> {
        sqlx::query_as::<_, ProjectPermission>(
            "INSERT INTO project_permissions (project_id, user_id, level) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (project_id, user_id) \
             DO UPDATE SET level = EXCLUDED.level, updated_at = NOW() \
             RETURNING *",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(level)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert permission", e))
    }

    async fn list_for_project(&self, project_id: Uuid) -> AppResult<Vec<ProjectPermission>> {
        sqlx::query_as::<_, ProjectPermission>(
            "SELECT * FROM project_permissions WHERE project_id = $1 ORDER BY created_at ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list permissions", e))
    }

    async fn delete(&self, project_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM project_permissions WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete permission", e)
                })?;
        Ok(result.rows_affected() > 0)
    }
}
