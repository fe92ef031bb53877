//! Route definitions for the SiteHub HTTP API.
//!
//! API routes are organized by domain and mounted under `/api`; the
//! canonical static path lives at `/static`. The router receives
//! `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(project_routes())
        .merge(version_routes())
        .merge(upload_routes())
        .merge(preview_routes())
        .merge(health_routes());

    // Wildcards do not match an empty remainder, so directory-style
    // requests with and without a trailing slash get explicit routes.
    let static_routes = Router::new()
        .route(
            "/static/{project_id}/{label}",
            get(handlers::preview::static_root),
        )
        .route(
            "/static/{project_id}/{label}/",
            get(handlers::preview::static_root),
        )
        .route(
            "/static/{project_id}/{label}/{*sub_path}",
            get(handlers::preview::static_content),
        );

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(static_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Auth endpoints: login, register, logout, profile
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/profile", get(handlers::auth::profile))
}

/// User administration endpoints
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::user::list_users))
        .route("/users/{id}", get(handlers::user::get_user))
        .route("/users/{id}/role", put(handlers::user::update_role))
}

/// Project CRUD and permission grants
fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(handlers::project::list_projects))
        .route("/projects", post(handlers::project::create_project))
        .route("/projects/{id}", get(handlers::project::get_project))
        .route("/projects/{id}", put(handlers::project::update_project))
        .route("/projects/{id}", delete(handlers::project::delete_project))
        .route(
            "/projects/{id}/permissions",
            post(handlers::project::grant_permission),
        )
}

/// Version listing, activation, deletion
fn version_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/versions/project/{project_id}",
            get(handlers::version::list_project_versions),
        )
        .route(
            "/versions/{id}/activate",
            put(handlers::version::activate_version),
        )
        .route("/versions/{id}", delete(handlers::version::delete_version))
}

/// Archive upload
fn upload_routes() -> Router<AppState> {
    Router::new().route("/upload", post(handlers::upload::upload_version))
}

/// Public share-link preview
fn preview_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/preview/share/{share_code}",
            get(handlers::preview::share_root),
        )
        .route(
            "/preview/share/{share_code}/",
            get(handlers::preview::share_root),
        )
        .route(
            "/preview/share/{share_code}/{*sub_path}",
            get(handlers::preview::share_content),
        )
        .route(
            "/preview/info/{share_code}",
            get(handlers::preview::share_info),
        )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// CORS layer from configuration. `["*"]` opens everything (development
/// only); otherwise the listed origins are allowed.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors.allowed_origins;

    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let list: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(list))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
