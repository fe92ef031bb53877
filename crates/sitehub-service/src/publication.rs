//! Version publication pipeline: upload, activation, deletion.
//!
//! An upload moves through validate → spool → extract → entry-point pass
//! → record → (optionally) activate. Metadata is written only after the
//! bytes are durably extracted, so a version row never references a
//! missing directory; the reverse failure mode (an orphaned directory) is
//! tolerated and logged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use sitehub_core::error::AppError;
use sitehub_core::result::AppResult;
use sitehub_entity::project::Project;
use sitehub_entity::store::{PermissionStore, ProjectStore, VersionStore};
use sitehub_entity::version::{CreateVersion, SiteVersion};
use sitehub_storage::archive::extract_archive;
use sitehub_storage::entrypoint::ensure_entry_point;
use sitehub_storage::layout::SiteLayout;

use crate::access::require_project_write;
use crate::context::RequestContext;

/// Parameters of a version upload.
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// Target project.
    pub project_id: Uuid,
    /// Version label, used as the directory key.
    pub label: String,
    /// Original file name of the uploaded archive.
    pub file_name: String,
    /// Archive bytes.
    pub data: Bytes,
    /// Whether to activate the version immediately after recording it.
    pub set_active: bool,
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct PublishedVersion {
    /// The recorded version.
    pub version: SiteVersion,
    /// Public static path of the version's content.
    pub static_url: String,
}

/// Orchestrates the upload pipeline and the activation transition.
pub struct PublicationService {
    /// Project store.
    projects: Arc<dyn ProjectStore>,
    /// Version store.
    versions: Arc<dyn VersionStore>,
    /// Permission store.
    permissions: Arc<dyn PermissionStore>,
    /// Filesystem layout.
    layout: SiteLayout,
    /// Maximum accepted archive size in bytes.
    max_upload_size_bytes: u64,
    /// Per-project locks serializing the two-step activation transition.
    activation_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for PublicationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicationService").finish()
    }
}

impl PublicationService {
    /// Creates a new publication service.
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        versions: Arc<dyn VersionStore>,
        permissions: Arc<dyn PermissionStore>,
        layout: SiteLayout,
        max_upload_size_bytes: u64,
    ) -> Self {
        Self {
            projects,
            versions,
            permissions,
            layout,
            max_upload_size_bytes,
            activation_locks: DashMap::new(),
        }
    }

    /// Runs the full upload pipeline for one archive.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        params: UploadParams,
    ) -> AppResult<PublishedVersion> {
        if !params.file_name.to_lowercase().ends_with(".zip") {
            return Err(AppError::validation("Only zip archives are supported"));
        }
        if params.data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if params.data.len() as u64 > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.max_upload_size_bytes
            )));
        }
        SiteLayout::validate_label(&params.label)?;

        let project = self
            .projects
            .find_by_id(params.project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))?;

        require_project_write(ctx, &project, &*self.permissions).await?;

        if self
            .layout
            .version_dir_exists(project.id, &params.label)
            .await?
        {
            return Err(AppError::conflict(format!(
                "Version '{}' already has content for this project",
                params.label
            )));
        }

        // Spool the archive. The guard removes the temp file on every
        // exit path, including a request future dropped on client
        // disconnect.
        self.layout.ensure_roots().await?;
        let temp = TempArtifact {
            path: self.layout.temp_archive_path(Uuid::new_v4()),
        };
        fs::write(&temp.path, &params.data).await?;

        self.ingest(ctx, &project, &params, &temp.path).await
    }

    /// Extract, resolve the entry point, record, and optionally activate.
    async fn ingest(
        &self,
        ctx: &RequestContext,
        project: &Project,
        params: &UploadParams,
        temp_path: &Path,
    ) -> AppResult<PublishedVersion> {
        let dest = self.layout.version_dir(project.id, &params.label);

        if let Err(e) = extract_archive(temp_path, &dest).await {
            self.discard_tree(project.id, &params.label).await;
            return Err(e);
        }

        ensure_entry_point(&dest).await;

        let create = CreateVersion {
            project_id: project.id,
            label: params.label.clone(),
            file_path: SiteLayout::version_rel_path(project.id, &params.label),
            size_bytes: params.data.len() as i64,
            uploaded_by: Some(ctx.user_id),
            share_code: Some(generate_share_code()),
        };

        let version = match self.versions.create(&create).await {
            Ok(version) => version,
            Err(e) => {
                // The directory was empty before this upload (occupied
                // labels are rejected up front), so the tree is ours to
                // discard.
                self.discard_tree(project.id, &params.label).await;
                return Err(e);
            }
        };

        if params.set_active {
            self.transition_active(project.id, version.id).await?;
        }

        info!(
            user_id = %ctx.user_id,
            project_id = %project.id,
            version_id = %version.id,
            label = %version.label,
            size = version.size_bytes,
            active = params.set_active,
            "Version uploaded"
        );

        Ok(PublishedVersion {
            static_url: format!("/static/{}/{}/", project.id, version.label),
            version,
        })
    }

    /// Activates a version as its project's published version.
    pub async fn activate(&self, ctx: &RequestContext, version_id: Uuid) -> AppResult<()> {
        let version = self
            .versions
            .find_by_id(version_id)
            .await?
            .ok_or_else(|| AppError::not_found("Version not found"))?;

        let project = self
            .projects
            .find_by_id(version.project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))?;

        require_project_write(ctx, &project, &*self.permissions).await?;

        self.transition_active(project.id, version.id).await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %project.id,
            version_id = %version.id,
            "Version activated"
        );
        Ok(())
    }

    /// Deletes a version: clears the project back-reference, removes the
    /// storage subtree (best effort), then deletes the metadata row.
    pub async fn delete_version(&self, ctx: &RequestContext, version_id: Uuid) -> AppResult<()> {
        let version = self
            .versions
            .find_by_id(version_id)
            .await?
            .ok_or_else(|| AppError::not_found("Version not found"))?;

        let project = self
            .projects
            .find_by_id(version.project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))?;

        require_project_write(ctx, &project, &*self.permissions).await?;

        if project.current_version_id == Some(version.id) {
            self.projects.set_current_version(project.id, None).await?;
        }

        if let Err(e) = self
            .layout
            .remove_version_dir(version.project_id, &version.label)
            .await
        {
            warn!(
                version_id = %version.id,
                error = %e,
                "Failed to remove version directory, metadata delete proceeds"
            );
        }

        self.versions.delete(version.id).await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %project.id,
            version_id = %version.id,
            "Version deleted"
        );
        Ok(())
    }

    /// Lists a project's versions, newest first.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
    ) -> AppResult<Vec<SiteVersion>> {
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))?;

        crate::access::require_project_read(ctx, &project, &*self.permissions).await?;

        self.versions.list_by_project(project_id).await
    }

    /// The two-step activation transition, serialized per project.
    ///
    /// Deactivate-all always precedes the single activate, so a crash
    /// between the steps leaves zero active versions, never two.
    async fn transition_active(&self, project_id: Uuid, version_id: Uuid) -> AppResult<()> {
        let lock = self
            .activation_locks
            .entry(project_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        self.versions.deactivate_all_for_project(project_id).await?;
        self.versions.set_active(version_id).await?;
        self.projects
            .set_current_version(project_id, Some(version_id))
            .await?;
        Ok(())
    }

    /// Best-effort removal of a partially populated version tree.
    async fn discard_tree(&self, project_id: Uuid, label: &str) {
        if let Err(e) = self.layout.remove_version_dir(project_id, label).await {
            warn!(
                project_id = %project_id,
                label = %label,
                error = %e,
                "Failed to discard partial version directory"
            );
        }
    }
}

/// Generate an opaque 32-hex share code.
fn generate_share_code() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Spooled upload archive, removed when the request scope ends.
struct TempArtifact {
    path: PathBuf,
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove upload temp file"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        InMemoryPermissionStore, InMemoryProjectStore, InMemoryVersionStore, user_context,
    };
    use sitehub_core::error::ErrorKind;
    use sitehub_entity::permission::PermissionLevel;
    use sitehub_entity::user::UserRole;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    struct Fixture {
        service: PublicationService,
        projects: Arc<InMemoryProjectStore>,
        versions: Arc<InMemoryVersionStore>,
        permissions: Arc<InMemoryPermissionStore>,
        tmp: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let layout =
            SiteLayout::with_roots(tmp.path().join("sites"), tmp.path().join("uploads"));

        let projects = Arc::new(InMemoryProjectStore::default());
        let versions = Arc::new(InMemoryVersionStore::default());
        let permissions = Arc::new(InMemoryPermissionStore::default());

        let service = PublicationService::new(
            Arc::clone(&projects) as Arc<dyn ProjectStore>,
            Arc::clone(&versions) as Arc<dyn VersionStore>,
            Arc::clone(&permissions) as Arc<dyn PermissionStore>,
            layout,
            10 * 1024 * 1024,
        );

        Fixture {
            service,
            projects,
            versions,
            permissions,
            tmp,
        }
    }

    async fn spool_count(fx: &Fixture) -> usize {
        let uploads = fx.tmp.path().join("uploads");
        let mut count = 0;
        if let Ok(mut entries) = tokio::fs::read_dir(&uploads).await {
            while let Ok(Some(_)) = entries.next_entry().await {
                count += 1;
            }
        }
        count
    }

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Bytes {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = SimpleFileOptions::default();
            for (name, content) in entries {
                writer.start_file(name.to_string(), options).unwrap();
                writer.write_all(content).unwrap();
            }
            writer.finish().unwrap();
        }
        Bytes::from(cursor.into_inner())
    }

    fn upload_params(project_id: Uuid, label: &str, data: Bytes) -> UploadParams {
        UploadParams {
            project_id,
            label: label.to_string(),
            file_name: "site.zip".to_string(),
            data,
            set_active: false,
        }
    }

    async fn seeded_project(fx: &Fixture, owner_id: Uuid) -> Project {
        fx.projects
            .create(&sitehub_entity::project::CreateProject {
                name: "demo".to_string(),
                description: None,
                owner_id,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_extracts_and_records() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ctx = user_context(owner, UserRole::User);
        let project = seeded_project(&fx, owner).await;

        let data = zip_bytes(&[("index.html", b"<h1>hi</h1>"), ("a/b.html", b"<p>b</p>")]);
        let size = data.len() as i64;

        let published = fx
            .service
            .upload(&ctx, upload_params(project.id, "v1", data))
            .await
            .unwrap();

        assert_eq!(published.version.label, "v1");
        assert_eq!(published.version.size_bytes, size);
        assert!(published.version.share_code.is_some());
        assert_eq!(
            published.static_url,
            format!("/static/{}/v1/", project.id)
        );

        let stored = fx
            .versions
            .find_by_id(published.version.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.file_path,
            format!("projects/{}/v1", project.id)
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_non_zip_filename() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ctx = user_context(owner, UserRole::User);
        let project = seeded_project(&fx, owner).await;

        let mut params = upload_params(project.id, "v1", zip_bytes(&[("x.html", b"x")]));
        params.file_name = "site.tar.gz".to_string();

        let err = fx.service.upload(&ctx, params).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(
            fx.versions.list_by_project(project.id).await.unwrap().len(),
            0
        );
    }

    #[tokio::test]
    async fn test_upload_without_write_access_is_forbidden() {
        let fx = fixture();
        let project = seeded_project(&fx, Uuid::new_v4()).await;
        let stranger = user_context(Uuid::new_v4(), UserRole::User);

        let err = fx
            .service
            .upload(
                &stranger,
                upload_params(project.id, "v1", zip_bytes(&[("x.html", b"x")])),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_upload_with_write_grant_succeeds() {
        let fx = fixture();
        let project = seeded_project(&fx, Uuid::new_v4()).await;
        let contributor = user_context(Uuid::new_v4(), UserRole::User);
        fx.permissions
            .upsert(project.id, contributor.user_id, PermissionLevel::Write)
            .await
            .unwrap();

        fx.service
            .upload(
                &contributor,
                upload_params(project.id, "v1", zip_bytes(&[("x.html", b"x")])),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_archive_leaves_no_row_and_no_tree() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ctx = user_context(owner, UserRole::User);
        let project = seeded_project(&fx, owner).await;

        let err = fx
            .service
            .upload(
                &ctx,
                upload_params(project.id, "v1", Bytes::from_static(b"not a zip")),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Extraction);

        assert_eq!(
            fx.versions.list_by_project(project.id).await.unwrap().len(),
            0
        );
        assert!(
            !fx.service
                .layout
                .version_dir_exists(project.id, "v1")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_traversal_archive_is_rejected() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ctx = user_context(owner, UserRole::User);
        let project = seeded_project(&fx, owner).await;

        let data = zip_bytes(&[("../escape.html", b"<p>nope</p>")]);
        let err = fx
            .service
            .upload(&ctx, upload_params(project.id, "v1", data))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsafeArchiveEntry);
        assert_eq!(
            fx.versions.list_by_project(project.id).await.unwrap().len(),
            0
        );
    }

    #[tokio::test]
    async fn test_occupied_label_is_a_conflict() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ctx = user_context(owner, UserRole::User);
        let project = seeded_project(&fx, owner).await;

        fx.service
            .upload(
                &ctx,
                upload_params(project.id, "v1", zip_bytes(&[("a.html", b"a")])),
            )
            .await
            .unwrap();

        let err = fx
            .service
            .upload(
                &ctx,
                upload_params(project.id, "v1", zip_bytes(&[("b.html", b"b")])),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_spool_file_removed_on_success_and_failure() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ctx = user_context(owner, UserRole::User);
        let project = seeded_project(&fx, owner).await;

        fx.service
            .upload(
                &ctx,
                upload_params(project.id, "v1", zip_bytes(&[("a.html", b"a")])),
            )
            .await
            .unwrap();
        assert_eq!(spool_count(&fx).await, 0);

        fx.service
            .upload(
                &ctx,
                upload_params(project.id, "v2", Bytes::from_static(b"not a zip")),
            )
            .await
            .unwrap_err();
        assert_eq!(spool_count(&fx).await, 0);
    }

    #[tokio::test]
    async fn test_activation_keeps_at_most_one_active() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ctx = user_context(owner, UserRole::User);
        let project = seeded_project(&fx, owner).await;

        let v1 = fx
            .service
            .upload(
                &ctx,
                upload_params(project.id, "v1", zip_bytes(&[("a.html", b"a")])),
            )
            .await
            .unwrap()
            .version;
        let v2 = fx
            .service
            .upload(
                &ctx,
                upload_params(project.id, "v2", zip_bytes(&[("b.html", b"b")])),
            )
            .await
            .unwrap()
            .version;

        fx.service.activate(&ctx, v1.id).await.unwrap();
        fx.service.activate(&ctx, v2.id).await.unwrap();

        assert_eq!(
            fx.versions
                .count_active_for_project(project.id)
                .await
                .unwrap(),
            1
        );
        let active: Vec<_> = fx
            .versions
            .list_by_project(project.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|v| v.is_active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, v2.id);

        let project = fx.projects.find_by_id(project.id).await.unwrap().unwrap();
        assert_eq!(project.current_version_id, Some(v2.id));
    }

    #[tokio::test]
    async fn test_activate_requires_write_access() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ctx = user_context(owner, UserRole::User);
        let project = seeded_project(&fx, owner).await;

        let version = fx
            .service
            .upload(
                &ctx,
                upload_params(project.id, "v1", zip_bytes(&[("a.html", b"a")])),
            )
            .await
            .unwrap()
            .version;

        let reader = user_context(Uuid::new_v4(), UserRole::User);
        fx.permissions
            .upsert(project.id, reader.user_id, PermissionLevel::Read)
            .await
            .unwrap();

        let err = fx.service.activate(&reader, version.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_upload_with_set_active() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ctx = user_context(owner, UserRole::User);
        let project = seeded_project(&fx, owner).await;

        let mut params = upload_params(project.id, "v1", zip_bytes(&[("a.html", b"a")]));
        params.set_active = true;

        let published = fx.service.upload(&ctx, params).await.unwrap();

        let stored = fx
            .versions
            .find_by_id(published.version.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_active);
        let project = fx.projects.find_by_id(project.id).await.unwrap().unwrap();
        assert_eq!(project.current_version_id, Some(stored.id));
    }

    #[tokio::test]
    async fn test_delete_clears_back_reference_and_tree() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ctx = user_context(owner, UserRole::User);
        let project = seeded_project(&fx, owner).await;

        let mut params = upload_params(project.id, "v1", zip_bytes(&[("a.html", b"a")]));
        params.set_active = true;
        let version = fx.service.upload(&ctx, params).await.unwrap().version;

        fx.service.delete_version(&ctx, version.id).await.unwrap();

        assert!(
            fx.versions
                .find_by_id(version.id)
                .await
                .unwrap()
                .is_none()
        );
        let project = fx.projects.find_by_id(project.id).await.unwrap().unwrap();
        assert_eq!(project.current_version_id, None);
        assert!(
            !fx.service
                .layout
                .version_dir_exists(project.id, "v1")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_concurrent_uploads_to_distinct_labels_do_not_interfere() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ctx = user_context(owner, UserRole::User);
        let project_a = seeded_project(&fx, owner).await;
        let project_b = seeded_project(&fx, owner).await;

        let upload_a = fx.service.upload(
            &ctx,
            upload_params(project_a.id, "v1", zip_bytes(&[("a.html", b"site a")])),
        );
        let upload_b = fx.service.upload(
            &ctx,
            upload_params(project_b.id, "v1", zip_bytes(&[("b.html", b"site b")])),
        );

        let (a, b) = tokio::join!(upload_a, upload_b);
        let a = a.unwrap();
        let b = b.unwrap();

        let dir_a = fx.service.layout.version_dir(project_a.id, "v1");
        let dir_b = fx.service.layout.version_dir(project_b.id, "v1");
        assert_eq!(
            tokio::fs::read(dir_a.join("a.html")).await.unwrap(),
            b"site a"
        );
        assert_eq!(
            tokio::fs::read(dir_b.join("b.html")).await.unwrap(),
            b"site b"
        );
        assert_ne!(a.version.id, b.version.id);
    }
}
