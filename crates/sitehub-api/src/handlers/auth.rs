//! Auth handlers — login, register, logout, profile.

use axum::Json;
use axum::extract::State;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, LoginResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let outcome = state
        .user_service
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
        user: outcome.user.into(),
    })))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .user_service
        .register(sitehub_service::user::RegisterRequest {
            username: req.username,
            password: req.password,
            email: req.email,
        })
        .await?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client simply discards its copy.
pub async fn logout(_auth: AuthUser) -> Json<ApiResponse<MessageResponse>> {
    Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    )))
}

/// GET /api/auth/profile
pub async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.profile(&auth).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
