use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{AuthUser, TokenService};
use crate::error::ApiError;
use crate::generation::ImageGenerator;
use crate::models::{GenerationHistory, Project};
use crate::storage::StorageProvider;
use crate::store::Store;

mod auth;
mod generation;
mod projects;
mod uploads;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub generator: Arc<ImageGenerator>,
    pub storage: Arc<dyn StorageProvider>,
    pub tokens: Arc<TokenService>,
    pub max_images_per_request: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me).patch(auth::update_me))
        .route("/api/projects", get(projects::list_projects).post(projects::create_project))
        .route(
            "/api/projects/:id",
            get(projects::get_project).put(projects::update_project).delete(projects::delete_project),
        )
        .route("/api/projects/:id/restore", post(projects::restore_project))
        .route("/api/projects/:id/history", get(projects::list_history))
        .route("/api/history/:id/favorite", post(projects::toggle_favorite))
        .route("/api/history/:id", axum::routing::delete(projects::delete_history))
        .route("/api/generate", post(generation::generate))
        .route("/api/inpaint", post(generation::inpaint))
        .route("/api/upscale", post(generation::upscale))
        .route("/api/uploads/*path", get(uploads::serve_upload))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "imageProvider": state.generator.provider_name(),
        "storageProvider": state.storage.name(),
    }))
}

/// Live project owned by `user`: 404 when missing or deleted, 403 when foreign.
fn owned_project(state: &AppState, user: &AuthUser, project_id: Uuid) -> Result<Project, ApiError> {
    let project = state
        .store
        .find_project(project_id)
        .ok_or_else(|| ApiError::NotFound("Project not found.".into()))?;
    if project.user_id != user.0.id {
        return Err(ApiError::Forbidden("You do not have access to this project.".into()));
    }
    Ok(project)
}

fn owned_history(state: &AppState, user: &AuthUser, history_id: Uuid) -> Result<GenerationHistory, ApiError> {
    let record = state
        .store
        .find_history(history_id)
        .ok_or_else(|| ApiError::NotFound("Generation history not found.".into()))?;
    if !state.store.is_owner(record.project_id, user.0.id) {
        return Err(ApiError::Forbidden("You do not have access to this history.".into()));
    }
    Ok(record)
}


#[cfg(test)]
mod tests {
    use super::test_support::TestApp;
    use axum::http::{Method, StatusCode};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn health_reports_providers() {
        let app = TestApp::new();
        let (status, body) = app.request(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["imageProvider"], "fake");
        assert_eq!(body["storageProvider"], "local");
    }

    #[tokio::test]
    async fn protected_routes_need_a_bearer_token() {
        let app = TestApp::new();
        let (status, body) = app.request(Method::GET, "/api/projects", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = app.request(Method::GET, "/api/projects", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
