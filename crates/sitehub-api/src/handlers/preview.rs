//! Static content serving: share-link preview and the canonical path.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use sitehub_core::error::AppError;
use sitehub_service::preview::ResolvedFile;

use crate::dto::response::{ApiResponse, ShareInfoResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/preview/share/{share_code}/{*sub_path}
pub async fn share_content(
    State(state): State<AppState>,
    Path((share_code, sub_path)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let resolved = state
        .preview_service
        .resolve_share(&share_code, &sub_path)
        .await?;
    serve_file(resolved).await
}

/// GET /api/preview/share/{share_code}
pub async fn share_root(
    State(state): State<AppState>,
    Path(share_code): Path<String>,
) -> Result<Response, ApiError> {
    let resolved = state.preview_service.resolve_share(&share_code, "").await?;
    serve_file(resolved).await
}

/// GET /api/preview/info/{share_code}
pub async fn share_info(
    State(state): State<AppState>,
    Path(share_code): Path<String>,
) -> Result<Json<ApiResponse<ShareInfoResponse>>, ApiError> {
    let version = state.preview_service.share_info(&share_code).await?;
    Ok(Json(ApiResponse::ok(ShareInfoResponse {
        version: version.label,
        created_at: version.created_at,
        file_size: version.size_bytes,
    })))
}

/// GET /static/{project_id}/{label}/{*sub_path}
pub async fn static_content(
    State(state): State<AppState>,
    Path((project_id, label, sub_path)): Path<(Uuid, String, String)>,
) -> Result<Response, ApiError> {
    let resolved = state
        .preview_service
        .resolve_direct(project_id, &label, &sub_path)
        .await?;
    serve_file(resolved).await
}

/// GET /static/{project_id}/{label}
pub async fn static_root(
    State(state): State<AppState>,
    Path((project_id, label)): Path<(Uuid, String)>,
) -> Result<Response, ApiError> {
    let resolved = state
        .preview_service
        .resolve_direct(project_id, &label, "")
        .await?;
    serve_file(resolved).await
}

/// Stream a resolved file with its content type and, for HTML, the
/// protective headers for untrusted third-party markup.
async fn serve_file(resolved: ResolvedFile) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(&resolved.path)
        .await
        .map_err(|_| AppError::not_found("File not found"))?;

    let stream = ReaderStream::new(file);

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, resolved.content_type);

    if resolved.is_html {
        builder = builder
            .header(header::X_FRAME_OPTIONS, "SAMEORIGIN")
            .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff");
    }

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")).into())
}
