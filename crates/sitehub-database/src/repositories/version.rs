//! Site version repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sitehub_core::error::{AppError, ErrorKind};
use sitehub_core::result::AppResult;
use sitehub_entity::store::VersionStore;
use sitehub_entity::version::{CreateVersion, SiteVersion};

/// Repository for site version CRUD and the activation transition.
#[derive(Debug, Clone)]
pub struct VersionRepository {
    pool: PgPool,
}

impl VersionRepository {
    /// Create a new version repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionStore for VersionRepository {
    async fn create(&self, data: &CreateVersion) -> AppResult<SiteVersion> {
        sqlx::query_as::<_, SiteVersion>(
            "INSERT INTO versions (project_id, label, file_path, size_bytes, uploaded_by, share_code) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.project_id)
        .bind(&data.label)
        .bind(&data.file_path)
        .bind(data.size_bytes)
        .bind(data.uploaded_by)
        .bind(&data.share_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("versions_share_code_key") =>
            {
                AppError::conflict("Share code collision, retry the upload")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create version", e),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SiteVersion>> {
        sqlx::query_as::<_, SiteVersion>("SELECT * FROM versions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    async fn find_by_share_code(&self, share_code: &str) -> AppResult<Option<SiteVersion>> {
        sqlx::query_as::<_, SiteVersion>("SELECT * FROM versions WHERE share_code = $1")
            .bind(share_code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find version by share code", e)
            })
    }

    async fn list_by_project(&self, project_id: Uuid) -> AppResult<Vec<SiteVersion>> {
        sqlx::query_as::<_, SiteVersion>(
            "SELECT * FROM versions WHERE project_id = $1 ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    async fn deactivate_all_for_project(&self, project_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE versions SET is_active = FALSE WHERE project_id = $1 AND is_active = TRUE",
        )
        .bind(project_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to deactivate versions", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn set_active(&self, version_id: Uuid) -> AppResult<SiteVersion> {
        sqlx::query_as::<_, SiteVersion>(
            "UPDATE versions SET is_active = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(version_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to activate version", e))?
        .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))
    }

    async fn count_active_for_project(&self, project_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM versions WHERE project_id = $1 AND is_active = TRUE",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count active versions", e)
        })
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM versions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete version", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
