//! Version upload handler (multipart).

use axum::Json;
use axum::extract::{Multipart, State};
use bytes::Bytes;
use uuid::Uuid;

use sitehub_core::error::AppError;
use sitehub_service::publication::UploadParams;

use crate::dto::response::{ApiResponse, UploadResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/upload — multipart {file, projectId, versionLabel, setActive}
pub async fn upload_version(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    let mut project_id: Option<Uuid> = None;
    let mut label: Option<String> = None;
    let mut set_active = false;
    let mut file_name: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "projectId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                project_id = Some(
                    Uuid::parse_str(&text)
                        .map_err(|_| AppError::validation("Invalid projectId"))?,
                );
            }
            "versionLabel" => {
                label = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            "setActive" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                set_active = matches!(text.as_str(), "true" | "1");
            }
            "file" => {
                file_name = field.file_name().map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let project_id =
        project_id.ok_or_else(|| AppError::validation("projectId is required"))?;
    let label = label.ok_or_else(|| AppError::validation("versionLabel is required"))?;
    let file_name = file_name.ok_or_else(|| AppError::validation("file is required"))?;
    let data = data.ok_or_else(|| AppError::validation("file data is required"))?;

    let published = state
        .publication_service
        .upload(
            &auth,
            UploadParams {
                project_id,
                label,
                file_name,
                data,
                set_active,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(UploadResponse {
        version_id: published.version.id,
        static_url: published.static_url,
    })))
}
