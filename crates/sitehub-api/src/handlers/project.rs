//! Project CRUD and grant handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use sitehub_entity::project::Project;
use sitehub_service::project::{CreateProjectRequest, UpdateProjectRequest};

use crate::dto::request::GrantPermissionRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = state.project_service.list_projects(&auth).await?;
    Ok(Json(ApiResponse::ok(projects)))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state.project_service.create_project(&auth, req).await?;
    Ok(Json(ApiResponse::ok(project)))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state.project_service.get_project(&auth, id).await?;
    Ok(Json(ApiResponse::ok(project)))
}

/// PUT /api/projects/{id}
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state.project_service.update_project(&auth, id, req).await?;
    Ok(Json(ApiResponse::ok(project)))
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.project_service.delete_project(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Project deleted successfully",
    ))))
}

/// POST /api/projects/{id}/permissions
pub async fn grant_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<GrantPermissionRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .project_service
        .grant_permission(&auth, id, req.user_id, req.level)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Permission granted successfully",
    ))))
}
