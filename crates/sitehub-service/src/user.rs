//! User registration, login, and administration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use sitehub_auth::jwt::encoder::JwtEncoder;
use sitehub_auth::password::PasswordHasher;
use sitehub_core::error::AppError;
use sitehub_core::result::AppResult;
use sitehub_entity::store::UserStore;
use sitehub_entity::user::{CreateUser, User, UserRole};

use crate::context::RequestContext;

/// Request to register a new account.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RegisterRequest {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Contact email.
    pub email: Option<String>,
}

/// Successful login outcome.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed bearer token.
    pub token: String,
    /// Token expiration.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: User,
}

/// Manages accounts and credentials.
pub struct UserService {
    /// User store.
    users: Arc<dyn UserStore>,
    /// Password hasher.
    hasher: PasswordHasher,
    /// Token encoder.
    encoder: JwtEncoder,
    /// Minimum password length at registration.
    password_min_length: usize,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish()
    }
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        encoder: JwtEncoder,
        password_min_length: usize,
    ) -> Self {
        Self {
            users,
            hasher,
            encoder,
            password_min_length,
        }
    }

    /// Registers a new account with the `user` role.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<User> {
        if req.username.trim().is_empty() {
            return Err(AppError::validation("Username must not be empty"));
        }
        if req.password.len() < self.password_min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.password_min_length
            )));
        }

        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Username '{}' is already taken",
                req.username
            )));
        }

        let password_hash = self.hasher.hash_password(&req.password)?;
        let user = self
            .users
            .create(&CreateUser {
                username: req.username,
                email: req.email,
                password_hash,
                role: UserRole::User,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues a bearer token.
    ///
    /// Failures do not reveal whether the username or the password was
    /// wrong.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

        let valid = self.hasher.verify_password(password, &user.password_hash)?;
        if !valid {
            return Err(AppError::unauthorized("Invalid username or password"));
        }

        let (token, expires_at) =
            self.encoder
                .generate_token(user.id, user.role, &user.username)?;

        info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(LoginOutcome {
            token,
            expires_at,
            user,
        })
    }

    /// Returns the caller's own account.
    pub async fn profile(&self, ctx: &RequestContext) -> AppResult<User> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Lists all users (admin only).
    pub async fn list_users(&self, ctx: &RequestContext) -> AppResult<Vec<User>> {
        if !ctx.is_admin() {
            return Err(AppError::forbidden("Administrator privileges required"));
        }
        self.users.list_all().await
    }

    /// Fetches a user by ID (admin or the user themselves).
    pub async fn get_user(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<User> {
        if !ctx.is_admin() && ctx.user_id != user_id {
            return Err(AppError::forbidden(
                "You do not have permission to view this user",
            ));
        }
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Changes a user's role (admin only, never their own).
    pub async fn update_role(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        role: UserRole,
    ) -> AppResult<User> {
        if !ctx.is_admin() {
            return Err(AppError::forbidden("Administrator privileges required"));
        }
        if ctx.user_id == user_id {
            return Err(AppError::validation("You cannot change your own role"));
        }

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let user = self.users.update_role(user_id, role).await?;

        info!(
            admin_id = %ctx.user_id,
            user_id = %user.id,
            role = %user.role,
            "User role updated"
        );
        Ok(user)
    }
}
