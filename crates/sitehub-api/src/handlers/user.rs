//! User administration handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::dto::request::UpdateRoleRequest;
use crate::dto::response::{ApiResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = state.user_service.list_users(&auth).await?;
    let users = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.get_user(&auth, id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/users/{id}/role
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.update_role(&auth, id, req.role).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
