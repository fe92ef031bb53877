//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sitehub_core::error::{AppError, ErrorKind};
use sitehub_core::result::AppResult;
use sitehub_entity::store::UserStore;
use sitehub_entity::user::{CreateUser, User, UserRole};

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("users_username_key") =>
            {
                AppError::conflict(format!("Username '{}' is already taken", data.username))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user role", e))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }
}
