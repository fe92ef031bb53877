//! Static content resolution for preview and canonical serving.
//!
//! Both entry modes — the project's canonical static path and the share
//! link — funnel into the same containment-checked resolution core.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use uuid::Uuid;

use sitehub_core::error::AppError;
use sitehub_core::result::AppResult;
use sitehub_entity::store::VersionStore;
use sitehub_entity::version::SiteVersion;
use sitehub_storage::layout::SiteLayout;
use sitehub_storage::mime;

/// Generic message for share-code misses. Deliberately does not
/// distinguish a bad code from an expired one.
const SHARE_NOT_FOUND: &str = "Preview link does not exist or has expired";

/// A resolved, servable file.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    /// Absolute path inside the version directory.
    pub path: PathBuf,
    /// Inferred content type.
    pub content_type: &'static str,
    /// Whether the response needs the protective HTML headers.
    pub is_html: bool,
}

/// Maps incoming (version, sub-path) requests to concrete files.
pub struct PreviewService {
    /// Version store.
    versions: Arc<dyn VersionStore>,
    /// Filesystem layout.
    layout: SiteLayout,
}

impl std::fmt::Debug for PreviewService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewService").finish()
    }
}

impl PreviewService {
    /// Creates a new preview service.
    pub fn new(versions: Arc<dyn VersionStore>, layout: SiteLayout) -> Self {
        Self { versions, layout }
    }

    /// Resolve a file through a share code (unauthenticated access).
    pub async fn resolve_share(
        &self,
        share_code: &str,
        sub_path: &str,
    ) -> AppResult<ResolvedFile> {
        let version = self
            .versions
            .find_by_share_code(share_code)
            .await?
            .ok_or_else(|| AppError::not_found(SHARE_NOT_FOUND))?;

        self.resolve(version.project_id, &version.label, sub_path)
            .await
    }

    /// Resolve a file through the canonical (project, label) address.
    pub async fn resolve_direct(
        &self,
        project_id: Uuid,
        label: &str,
        sub_path: &str,
    ) -> AppResult<ResolvedFile> {
        self.resolve(project_id, label, sub_path).await
    }

    /// Version metadata for a share code.
    pub async fn share_info(&self, share_code: &str) -> AppResult<SiteVersion> {
        self.versions
            .find_by_share_code(share_code)
            .await?
            .ok_or_else(|| AppError::not_found(SHARE_NOT_FOUND))
    }

    /// Containment-checked resolution with index fallback.
    ///
    /// Order: the exact file if it exists; `index.html` for directory
    /// requests; otherwise not found.
    async fn resolve(
        &self,
        project_id: Uuid,
        label: &str,
        sub_path: &str,
    ) -> AppResult<ResolvedFile> {
        let resolved = self.layout.resolve_file(project_id, label, sub_path)?;

        match fs::metadata(&resolved).await {
            Ok(meta) if meta.is_file() => Ok(Self::servable(resolved)),
            Ok(meta) if meta.is_dir() => {
                let index = resolved.join("index.html");
                match fs::metadata(&index).await {
                    Ok(meta) if meta.is_file() => Ok(Self::servable(index)),
                    _ => Err(AppError::not_found("File not found")),
                }
            }
            _ => Err(AppError::not_found("File not found")),
        }
    }

    fn servable(path: PathBuf) -> ResolvedFile {
        let content_type = mime::content_type_for(&path);
        ResolvedFile {
            path,
            content_type,
            is_html: mime::is_html(content_type),
        }
    }
}
