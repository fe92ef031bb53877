//! Version listing, activation, and deletion handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use sitehub_entity::version::SiteVersion;

use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/versions/project/{project_id}
pub async fn list_project_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<SiteVersion>>>, ApiError> {
    let versions = state
        .publication_service
        .list_versions(&auth, project_id)
        .await?;
    Ok(Json(ApiResponse::ok(versions)))
}

/// PUT /api/versions/{id}/activate
pub async fn activate_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.publication_service.activate(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Version activated successfully",
    ))))
}

/// DELETE /api/versions/{id}
pub async fn delete_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.publication_service.delete_version(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Version deleted successfully",
    ))))
}
