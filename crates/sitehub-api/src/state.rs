//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use sitehub_auth::jwt::decoder::JwtDecoder;
use sitehub_core::config::AppConfig;
use sitehub_service::preview::PreviewService;
use sitehub_service::project::ProjectService;
use sitehub_service::publication::PublicationService;
use sitehub_service::user::UserService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool (health checks).
    pub db_pool: PgPool,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Account and credential service.
    pub user_service: Arc<UserService>,
    /// Project CRUD and grants service.
    pub project_service: Arc<ProjectService>,
    /// Upload/activation/deletion pipeline.
    pub publication_service: Arc<PublicationService>,
    /// Static content resolution.
    pub preview_service: Arc<PreviewService>,
}
