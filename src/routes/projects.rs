use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::{owned_history, owned_project, AppState};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson, ApiResponse};
use crate::models::{CreateProjectRequest, GenerationHistory, HistoryQuery, Project, UpdateProjectRequest};
use crate::validation::{validate_create_project, validate_update_project};

pub async fn list_projects(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<ApiResponse<Vec<Project>>> {
    Json(ApiResponse::ok(state.store.list_projects(user.id)))
}

pub async fn create_project(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Project>>), ApiError> {
    validate_create_project(&body)?;
    let body = CreateProjectRequest { name: body.name.trim().to_string(), ..body };
    let project = state.store.create_project(user.id, body);
    info!("📁 Project {} created by {}", project.id, user.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(project).with_message("Project created."))))
}

pub async fn get_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    Ok(Json(ApiResponse::ok(owned_project(&state, &user, id)?)))
}

pub async fn update_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdateProjectRequest>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    owned_project(&state, &user, id)?;
    validate_update_project(&body)?;
    let body = UpdateProjectRequest { name: body.name.map(|n| n.trim().to_string()), ..body };
    let project = state
        .store
        .update_project(id, body)
        .ok_or_else(|| ApiError::NotFound("Project not found.".into()))?;
    Ok(Json(ApiResponse::ok(project).with_message("Project updated.")))
}

pub async fn delete_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    owned_project(&state, &user, id)?;
    state.store.soft_delete_project(id);
    info!("🗑️ Project {} moved to trash", id);
    Ok(Json(ApiResponse::message("Project deleted.")))
}

/// Deleted projects are not visible to `owned_project`, so ownership is
/// checked directly.
pub async fn restore_project(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    if !state.store.is_owner(id, user.id) {
        return Err(ApiError::NotFound("Project not found.".into()));
    }
    let project = state
        .store
        .restore_project(id)
        .ok_or_else(|| ApiError::NotFound("Project not found.".into()))?;
    Ok(Json(ApiResponse::ok(project).with_message("Project restored.")))
}

pub async fn list_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<GenerationHistory>>>, ApiError> {
    owned_project(&state, &user, id)?;
    Ok(Json(ApiResponse::ok(state.store.list_history(id, query.favorites))))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GenerationHistory>>, ApiError> {
    owned_history(&state, &user, id)?;
    let record = state
        .store
        .toggle_favorite(id)
        .ok_or_else(|| ApiError::NotFound("Generation history not found.".into()))?;
    Ok(Json(ApiResponse::ok(record)))
}

/// Removes the record and the output files it owns. Inputs may be shared
/// with other records and are left in place.
pub async fn delete_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    owned_history(&state, &user, id)?;
    let Some(record) = state.store.delete_history(id) else {
        return Err(ApiError::NotFound("Generation history not found.".into()));
    };

    for url in &record.output_images {
        let Some(path) = state.storage.path_from_url(url) else { continue };
        if let Err(e) = state.storage.delete(&path).await {
            warn!("Could not delete {}: {}", path, e);
        }
    }
    Ok(Json(ApiResponse::message("History deleted.")))
}
