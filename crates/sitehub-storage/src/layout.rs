//! On-disk layout for extracted site versions and upload spooling.
//!
//! Version content lives under `{site_root}/projects/{project_id}/{label}`.
//! The same formula backs both the stored `file_path` column and the
//! serving path, so the two can never drift apart.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use sitehub_core::config::storage::StorageConfig;
use sitehub_core::error::AppError;
use sitehub_core::result::AppResult;

use crate::paths::sanitize_relative;

/// Resolves every filesystem path the platform touches.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    /// Root directory for extracted site versions.
    site_root: PathBuf,
    /// Spool directory for uploaded archives.
    upload_root: PathBuf,
}

impl SiteLayout {
    /// Create a layout from storage configuration.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            site_root: PathBuf::from(&config.site_root),
            upload_root: PathBuf::from(&config.upload_dir),
        }
    }

    /// Create a layout from explicit roots (used by tests).
    pub fn with_roots(site_root: impl Into<PathBuf>, upload_root: impl Into<PathBuf>) -> Self {
        Self {
            site_root: site_root.into(),
            upload_root: upload_root.into(),
        }
    }

    /// Create both root directories if they do not exist yet.
    pub async fn ensure_roots(&self) -> AppResult<()> {
        fs::create_dir_all(&self.site_root).await?;
        fs::create_dir_all(&self.upload_root).await?;
        Ok(())
    }

    /// Validate a version label for use as a directory name.
    ///
    /// Labels are single path segments; anything that could change the
    /// derived directory is refused.
    pub fn validate_label(label: &str) -> AppResult<()> {
        if label.is_empty() || label.len() > 50 {
            return Err(AppError::validation(
                "Version label must be between 1 and 50 characters",
            ));
        }
        if label == "." || label == ".." || label.contains(['/', '\\']) {
            return Err(AppError::validation(
                "Version label must not contain path separators",
            ));
        }
        Ok(())
    }

    /// Storage path of a version relative to the site root.
    pub fn version_rel_path(project_id: Uuid, label: &str) -> String {
        format!("projects/{project_id}/{label}")
    }

    /// Absolute directory of a version.
    pub fn version_dir(&self, project_id: Uuid, label: &str) -> PathBuf {
        self.site_root
            .join("projects")
            .join(project_id.to_string())
            .join(label)
    }

    /// Resolve a request sub-path inside a version directory.
    ///
    /// The sub-path is normalized and verified to stay inside the version
    /// directory; a containment violation is a `Forbidden` error
    /// regardless of whether the target exists.
    pub fn resolve_file(
        &self,
        project_id: Uuid,
        label: &str,
        sub_path: &str,
    ) -> AppResult<PathBuf> {
        let root = self.version_dir(project_id, label);
        let clean = sanitize_relative(sub_path)
            .ok_or_else(|| AppError::forbidden("Access denied"))?;

        let resolved = root.join(clean);
        if !resolved.starts_with(&root) {
            return Err(AppError::forbidden("Access denied"));
        }
        Ok(resolved)
    }

    /// Spool path for an uploaded archive.
    pub fn temp_archive_path(&self, upload_id: Uuid) -> PathBuf {
        self.upload_root.join(format!("{upload_id}.zip"))
    }

    /// Remove a version's directory tree. Returns `false` when the
    /// directory did not exist.
    pub async fn remove_version_dir(&self, project_id: Uuid, label: &str) -> AppResult<bool> {
        let dir = self.version_dir(project_id, label);
        if !fs::try_exists(&dir).await? {
            return Ok(false);
        }
        fs::remove_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Removed version directory");
        Ok(true)
    }

    /// Whether a version's directory already holds content.
    pub async fn version_dir_exists(&self, project_id: Uuid, label: &str) -> AppResult<bool> {
        Ok(fs::try_exists(self.version_dir(project_id, label)).await?)
    }

    /// The site root (for wiring static serving).
    pub fn site_root(&self) -> &Path {
        &self.site_root
    }
}
