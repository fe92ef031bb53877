//! In-memory persistence-port implementations for service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use sitehub_core::error::AppError;
use sitehub_core::result::AppResult;
use sitehub_entity::permission::{PermissionLevel, ProjectPermission};
use sitehub_entity::project::{CreateProject, Project};
use sitehub_entity::store::{PermissionStore, ProjectStore, UserStore, VersionStore};
use sitehub_entity::user::{CreateUser, User, UserRole};
use sitehub_entity::version::{CreateVersion, SiteVersion};

use crate::context::RequestContext;

/// Build a request context for a test caller.
pub fn user_context(user_id: Uuid, role: UserRole) -> RequestContext {
    RequestContext::new(user_id, role, format!("user-{user_id}"))
}

/// Build a detached project row owned by the given user.
pub fn project_with_owner(owner_id: Uuid) -> Project {
    let now = Utc::now();
    Project {
        id: Uuid::new_v4(),
        name: "test-project".to_string(),
        description: None,
        owner_id,
        manager_id: None,
        current_version_id: None,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.username == data.username) {
            return Err(AppError::conflict(format!(
                "Username '{}' is already taken",
                data.username
            )));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    projects: Mutex<HashMap<Uuid, Project>>,
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn create(&self, data: &CreateProject) -> AppResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            description: data.description.clone(),
            owner_id: data.owner_id,
            manager_id: None,
            current_version_id: None,
            created_at: now,
            updated_at: now,
        };
        self.projects
            .lock()
            .unwrap()
            .insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Project>> {
        Ok(self.projects.lock().unwrap().get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Project>> {
        Ok(self.projects.lock().unwrap().values().cloned().collect())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Project>> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(&self, project: &Project) -> AppResult<Project> {
        let mut projects = self.projects.lock().unwrap();
        let existing = projects
            .get_mut(&project.id)
            .ok_or_else(|| AppError::not_found(format!("Project {} not found", project.id)))?;
        *existing = project.clone();
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn set_current_version(
        &self,
        project_id: Uuid,
        version_id: Option<Uuid>,
    ) -> AppResult<()> {
        let mut projects = self.projects.lock().unwrap();
        if let Some(project) = projects.get_mut(&project_id) {
            project.current_version_id = version_id;
            project.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.projects.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryVersionStore {
    versions: Mutex<HashMap<Uuid, SiteVersion>>,
}

#[async_trait]
impl VersionStore for InMemoryVersionStore {
    async fn create(&self, data: &CreateVersion) -> AppResult<SiteVersion> {
        let version = SiteVersion {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            label: data.label.clone(),
            file_path: data.file_path.clone(),
            size_bytes: data.size_bytes,
            uploaded_by: data.uploaded_by,
            is_active: false,
            share_code: data.share_code.clone(),
            created_at: Utc::now(),
        };
        self.versions
            .lock()
            .unwrap()
            .insert(version.id, version.clone());
        Ok(version)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SiteVersion>> {
        Ok(self.versions.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_share_code(&self, share_code: &str) -> AppResult<Option<SiteVersion>> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .values()
            .find(|v| v.share_code.as_deref() == Some(share_code))
            .cloned())
    }

    async fn list_by_project(&self, project_id: Uuid) -> AppResult<Vec<SiteVersion>> {
        let mut versions: Vec<SiteVersion> = self
            .versions
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.project_id == project_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(versions)
    }

    async fn deactivate_all_for_project(&self, project_id: Uuid) -> AppResult<u64> {
        let mut versions = self.versions.lock().unwrap();
        let mut touched = 0;
        for version in versions.values_mut() {
            if version.project_id == project_id && version.is_active {
                version.is_active = false;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn set_active(&self, version_id: Uuid) -> AppResult<SiteVersion> {
        let mut versions = self.versions.lock().unwrap();
        let version = versions
            .get_mut(&version_id)
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))?;
        version.is_active = true;
        Ok(version.clone())
    }

    async fn count_active_for_project(&self, project_id: Uuid) -> AppResult<i64> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.project_id == project_id && v.is_active)
            .count() as i64)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.versions.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    grants: Mutex<HashMap<(Uuid, Uuid), ProjectPermission>>,
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn find(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<ProjectPermission>> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .get(&(project_id, user_id))
            .cloned())
    }

    async fn upsert(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        level: PermissionLevel,
    ) -> AppResult<ProjectPermission> {
        let now = Utc::now();
        let mut grants = self.grants.lock().unwrap();
        let grant = grants
            .entry((project_id, user_id))
            .and_modify(|g| {
                g.level = level;
                g.updated_at = now;
            })
            .or_insert_with(|| ProjectPermission {
                id: Uuid::new_v4(),
                project_id,
                user_id,
                level,
                created_at: now,
                updated_at: now,
            });
        Ok(grant.clone())
    }

    async fn list_for_project(&self, project_id: Uuid) -> AppResult<Vec<ProjectPermission>> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .values()
            .filter(|g| g.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, project_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .remove(&(project_id, user_id))
            .is_some())
    }
}
