//! In-memory repositories behind `parking_lot` locks.
//!
//! Locks are only taken inside these methods, so no guard can be held across
//! an `.await` in a handler.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CreateProjectRequest, GenerationHistory, NewHistory, Project, RefreshTokenRecord, UpdateProfileRequest,
    UpdateProjectRequest, User,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
}

#[derive(Default)]
pub struct Store {
    users: RwLock<HashMap<Uuid, User>>,
    refresh_tokens: RwLock<HashMap<String, RefreshTokenRecord>>,
    projects: RwLock<HashMap<Uuid, Project>>,
    history: RwLock<HashMap<Uuid, GenerationHistory>>,
}

impl Store {
    // --- Users ---

    pub fn find_user(&self, id: Uuid) -> Option<User> {
        self.users.read().get(&id).cloned()
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users.read().values().find(|u| u.email == email).cloned()
    }

    pub fn create_user(&self, email: String, password_hash: String, name: String) -> Result<User, StoreError> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name,
            profile_image: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn update_user(&self, id: Uuid, update: UpdateProfileRequest) -> Option<User> {
        let mut users = self.users.write();
        let user = users.get_mut(&id)?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(image) = update.profile_image {
            user.profile_image = Some(image);
        }
        user.updated_at = Utc::now();
        Some(user.clone())
    }

    // --- Refresh tokens ---

    pub fn save_refresh_token(&self, record: RefreshTokenRecord) {
        self.refresh_tokens.write().insert(record.token.clone(), record);
    }

    pub fn find_refresh_token(&self, token: &str) -> Option<RefreshTokenRecord> {
        self.refresh_tokens.read().get(token).cloned()
    }

    pub fn delete_refresh_token(&self, token: &str) -> bool {
        self.refresh_tokens.write().remove(token).is_some()
    }

    pub fn delete_refresh_tokens_for(&self, user_id: Uuid) {
        self.refresh_tokens.write().retain(|_, record| record.user_id != user_id);
    }

    // --- Projects ---

    /// Soft-deleted projects are invisible here.
    pub fn find_project(&self, id: Uuid) -> Option<Project> {
        self.projects.read().get(&id).filter(|p| p.deleted_at.is_none()).cloned()
    }

    /// Newest update first.
    pub fn list_projects(&self, user_id: Uuid) -> Vec<Project> {
        let mut projects: Vec<Project> = self
            .projects
            .read()
            .values()
            .filter(|p| p.user_id == user_id && p.deleted_at.is_none())
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        projects
    }

    pub fn create_project(&self, user_id: Uuid, request: CreateProjectRequest) -> Project {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            user_id,
            name: request.name,
            description: request.description,
            category: request.category,
            ip_character: request.ip_character,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.projects.write().insert(project.id, project.clone());
        project
    }

    pub fn update_project(&self, id: Uuid, update: UpdateProjectRequest) -> Option<Project> {
        let mut projects = self.projects.write();
        let project = projects.get_mut(&id).filter(|p| p.deleted_at.is_none())?;
        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(description) = update.description {
            project.description = Some(description);
        }
        if let Some(category) = update.category {
            project.category = category;
        }
        if let Some(ip_character) = update.ip_character {
            project.ip_character = Some(ip_character);
        }
        project.updated_at = Utc::now();
        Some(project.clone())
    }

    pub fn soft_delete_project(&self, id: Uuid) -> bool {
        match self.projects.write().get_mut(&id) {
            Some(project) if project.deleted_at.is_none() => {
                project.deleted_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }

    pub fn restore_project(&self, id: Uuid) -> Option<Project> {
        let mut projects = self.projects.write();
        let project = projects.get_mut(&id)?;
        project.deleted_at = None;
        project.updated_at = Utc::now();
        Some(project.clone())
    }

    /// Ownership holds for soft-deleted projects too, so they can be restored.
    pub fn is_owner(&self, project_id: Uuid, user_id: Uuid) -> bool {
        self.projects.read().get(&project_id).is_some_and(|p| p.user_id == user_id)
    }

    // --- Generation history ---

    pub fn find_history(&self, id: Uuid) -> Option<GenerationHistory> {
        self.history.read().get(&id).cloned()
    }

    /// Newest first.
    pub fn list_history(&self, project_id: Uuid, favorites_only: bool) -> Vec<GenerationHistory> {
        let mut records: Vec<GenerationHistory> = self
            .history
            .read()
            .values()
            .filter(|h| h.project_id == project_id && (!favorites_only || h.is_favorite))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    pub fn create_history(&self, new: NewHistory) -> GenerationHistory {
        let record = GenerationHistory {
            id: Uuid::new_v4(),
            project_id: new.project_id,
            mode: new.mode,
            input_images: new.input_images,
            output_images: new.output_images,
            settings: new.settings,
            is_favorite: false,
            created_at: Utc::now(),
        };
        self.history.write().insert(record.id, record.clone());

        // Generating counts as activity on the project.
        if let Some(project) = self.projects.write().get_mut(&record.project_id) {
            project.updated_at = record.created_at;
        }
        record
    }

    pub fn toggle_favorite(&self, id: Uuid) -> Option<GenerationHistory> {
        let mut history = self.history.write();
        let record = history.get_mut(&id)?;
        record.is_favorite = !record.is_favorite;
        Some(record.clone())
    }

    pub fn delete_history(&self, id: Uuid) -> Option<GenerationHistory> {
        self.history.write().remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::prompt::{GenerationMode, GenerationSettings};
    use pretty_assertions::assert_eq;

    fn project_request(name: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            name: name.into(),
            description: None,
            category: Category::Figures,
            ip_character: None,
        }
    }

    fn history(project_id: Uuid) -> NewHistory {
        NewHistory {
            project_id,
            mode: GenerationMode::IpReplacement,
            input_images: vec!["in.png".into()],
            output_images: vec!["out.png".into()],
            settings: GenerationSettings::default(),
        }
    }

    #[test]
    fn duplicate_emails_are_rejected() {
        let store = Store::default();
        store.create_user("a@example.com".into(), "h".into(), "Ann".into()).unwrap();
        assert_eq!(
            store.create_user("a@example.com".into(), "h".into(), "Other".into()).unwrap_err(),
            StoreError::DuplicateEmail
        );
        assert_eq!(store.find_user_by_email("a@example.com").unwrap().name, "Ann");
    }

    #[test]
    fn profile_update_is_partial() {
        let store = Store::default();
        let user = store.create_user("a@example.com".into(), "h".into(), "Ann".into()).unwrap();
        let updated = store
            .update_user(user.id, UpdateProfileRequest { profile_image: Some("p.png".into()), ..Default::default() })
            .unwrap();
        assert_eq!(updated.name, "Ann");
        assert_eq!(updated.profile_image.as_deref(), Some("p.png"));
    }

    #[test]
    fn refresh_tokens_are_scoped_per_user() {
        let store = Store::default();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        for (token, user_id) in [("a1", alice), ("a2", alice), ("b1", bob)] {
            store.save_refresh_token(RefreshTokenRecord {
                token: token.into(),
                user_id,
                expires_at: Utc::now(),
                created_at: Utc::now(),
            });
        }

        store.delete_refresh_tokens_for(alice);
        assert!(store.find_refresh_token("a1").is_none());
        assert!(store.find_refresh_token("a2").is_none());
        assert!(store.delete_refresh_token("b1"));
        assert!(!store.delete_refresh_token("b1"));
    }

    #[test]
    fn soft_delete_hides_and_restore_returns() {
        let store = Store::default();
        let owner = Uuid::new_v4();
        let project = store.create_project(owner, project_request("Mugs"));

        assert!(store.soft_delete_project(project.id));
        assert!(!store.soft_delete_project(project.id));
        assert!(store.find_project(project.id).is_none());
        assert!(store.list_projects(owner).is_empty());
        assert!(store.update_project(project.id, UpdateProjectRequest::default()).is_none());
        assert!(store.is_owner(project.id, owner));

        let restored = store.restore_project(project.id).unwrap();
        assert_eq!(restored.deleted_at, None);
        assert_eq!(store.list_projects(owner).len(), 1);
    }

    #[test]
    fn projects_list_only_own_and_most_recent_first() {
        let store = Store::default();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let first = store.create_project(alice, project_request("First"));
        let second = store.create_project(alice, project_request("Second"));
        store.create_project(bob, project_request("Bob's"));

        store.update_project(first.id, UpdateProjectRequest { name: Some("First, renamed".into()), ..Default::default() });

        let names: Vec<_> = store.list_projects(alice).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["First, renamed".to_string(), "Second".to_string()]);
        assert!(!store.is_owner(second.id, bob));
    }

    #[test]
    fn history_favorites_and_deletion() {
        let store = Store::default();
        let project = store.create_project(Uuid::new_v4(), project_request("Mugs"));
        let a = store.create_history(history(project.id));
        let b = store.create_history(history(project.id));
        store.create_history(history(Uuid::new_v4()));

        assert_eq!(store.list_history(project.id, false).len(), 2);
        assert!(store.toggle_favorite(b.id).unwrap().is_favorite);

        let favorites = store.list_history(project.id, true);
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, b.id);

        assert!(!store.toggle_favorite(b.id).unwrap().is_favorite);
        assert_eq!(store.delete_history(a.id).map(|h| h.id), Some(a.id));
        assert!(store.find_history(a.id).is_none());
        assert!(store.delete_history(a.id).is_none());
    }
}
