//! Project authorization checks.
//!
//! Write access: admin, project owner, delegated manager, or an explicit
//! `write` grant. Read access additionally accepts a `read` grant.

use sitehub_core::error::AppError;
use sitehub_core::result::AppResult;
use sitehub_entity::permission::PermissionLevel;
use sitehub_entity::project::Project;
use sitehub_entity::store::PermissionStore;

use crate::context::RequestContext;

/// Require write authorization on a project.
pub async fn require_project_write(
    ctx: &RequestContext,
    project: &Project,
    permissions: &dyn PermissionStore,
) -> AppResult<()> {
    if ctx.is_admin() || project.is_owned_or_managed_by(ctx.user_id) {
        return Ok(());
    }

    match permissions.find(project.id, ctx.user_id).await? {
        Some(grant) if grant.level == PermissionLevel::Write => Ok(()),
        _ => Err(AppError::forbidden(
            "You do not have write access to this project",
        )),
    }
}

/// Require read authorization on a project.
pub async fn require_project_read(
    ctx: &RequestContext,
    project: &Project,
    permissions: &dyn PermissionStore,
) -> AppResult<()> {
    if ctx.is_admin() || project.is_owned_or_managed_by(ctx.user_id) {
        return Ok(());
    }

    match permissions.find(project.id, ctx.user_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::forbidden(
            "You do not have access to this project",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryPermissionStore, project_with_owner, user_context};
    use sitehub_core::error::ErrorKind;
    use sitehub_entity::user::UserRole;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_admin_and_owner_and_manager_can_write() {
        let permissions = InMemoryPermissionStore::default();
        let owner = Uuid::new_v4();
        let manager = Uuid::new_v4();
        let mut project = project_with_owner(owner);
        project.manager_id = Some(manager);

        let admin = user_context(Uuid::new_v4(), UserRole::Admin);
        let owner_ctx = user_context(owner, UserRole::User);
        let manager_ctx = user_context(manager, UserRole::User);

        for ctx in [&admin, &owner_ctx, &manager_ctx] {
            require_project_write(ctx, &project, &permissions)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_write_grant_allows_write_but_read_grant_does_not() {
        let permissions = InMemoryPermissionStore::default();
        let project = project_with_owner(Uuid::new_v4());

        let writer = user_context(Uuid::new_v4(), UserRole::User);
        let reader = user_context(Uuid::new_v4(), UserRole::User);

        permissions
            .upsert(project.id, writer.user_id, PermissionLevel::Write)
            .await
            .unwrap();
        permissions
            .upsert(project.id, reader.user_id, PermissionLevel::Read)
            .await
            .unwrap();

        require_project_write(&writer, &project, &permissions)
            .await
            .unwrap();

        let err = require_project_write(&reader, &project, &permissions)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        // The read grant is still enough to read.
        require_project_read(&reader, &project, &permissions)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stranger_is_denied() {
        let permissions = InMemoryPermissionStore::default();
        let project = project_with_owner(Uuid::new_v4());
        let stranger = user_context(Uuid::new_v4(), UserRole::User);

        let err = require_project_read(&stranger, &project, &permissions)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }
}
