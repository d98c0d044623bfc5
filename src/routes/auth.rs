use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use tracing::info;

use super::AppState;
use crate::auth::{hash_password, verify_password, AuthUser, TokenKind};
use crate::error::{ApiError, ApiJson, ApiResponse};
use crate::models::{
    AuthResponse, RefreshRequest, RefreshTokenRecord, SignInRequest, SignUpRequest, UpdateProfileRequest, User,
    UserProfile,
};
use crate::validation::{validate_profile_update, validate_sign_in, validate_sign_up};

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Issues an access/refresh pair and records the refresh token.
fn issue_session(state: &AppState, user: &User) -> Result<AuthResponse, ApiError> {
    let access_token = state.tokens.issue(user, TokenKind::Access)?;
    let refresh_token = state.tokens.issue(user, TokenKind::Refresh)?;
    state.store.save_refresh_token(RefreshTokenRecord {
        token: refresh_token.clone(),
        user_id: user.id,
        expires_at: state.tokens.refresh_expiry(),
        created_at: Utc::now(),
    });
    Ok(AuthResponse { user: UserProfile::from(user), access_token, refresh_token })
}

async fn run_blocking<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> Result<T, ApiError> {
    tokio::task::spawn_blocking(f).await.map_err(|e| ApiError::Internal(e.to_string()))
}

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignUpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    validate_sign_up(&body)?;
    let email = body.email.trim().to_lowercase();
    if state.store.find_user_by_email(&email).is_some() {
        return Err(ApiError::Conflict("Email is already in use.".into()));
    }

    let password = body.password;
    let password_hash = run_blocking(move || hash_password(&password)).await?;
    let user = state.store.create_user(email, password_hash, body.name.trim().to_string())?;
    info!("👤 New user signed up: {}", user.id);

    let session = issue_session(&state, &user)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session).with_message("Sign-up complete."))))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignInRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    validate_sign_in(&body)?;
    let user = state
        .store
        .find_user_by_email(&body.email.trim().to_lowercase())
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let (password, hash) = (body.password, user.password_hash.clone());
    if !run_blocking(move || verify_password(&password, &hash)).await?? {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    // One live session per user.
    state.store.delete_refresh_tokens_for(user.id);
    let session = issue_session(&state, &user)?;
    info!("🔑 User logged in: {}", user.id);
    Ok(Json(ApiResponse::ok(session).with_message("Logged in.")))
}

pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    if body.refresh_token.trim().is_empty() {
        return Err(ApiError::Validation("Refresh token is required.".into()));
    }

    let claims = state
        .tokens
        .verify(&body.refresh_token, TokenKind::Refresh)
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token.".into()))?;

    let stored = state
        .store
        .find_refresh_token(&body.refresh_token)
        .filter(|record| record.user_id == claims.sub);
    let Some(stored) = stored else {
        return Err(ApiError::Unauthorized("Refresh token has been revoked.".into()));
    };
    if stored.expires_at < Utc::now() {
        state.store.delete_refresh_token(&stored.token);
        return Err(ApiError::Unauthorized("Session expired. Please sign in again.".into()));
    }

    let user = state
        .store
        .find_user(claims.sub)
        .ok_or_else(|| ApiError::NotFound("User not found.".into()))?;

    // Only the caller that removes the token may rotate it.
    if !state.store.delete_refresh_token(&stored.token) {
        return Err(ApiError::Unauthorized("Refresh token has been revoked.".into()));
    }
    let session = issue_session(&state, &user)?;
    Ok(Json(ApiResponse::ok(session)))
}

pub async fn logout(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<ApiResponse<()>> {
    state.store.delete_refresh_tokens_for(user.id);
    info!("👋 User logged out: {}", user.id);
    Json(ApiResponse::message("Logged out."))
}

pub async fn me(AuthUser(user): AuthUser) -> Json<ApiResponse<UserProfile>> {
    Json(ApiResponse::ok(UserProfile::from(&user)))
}

pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    validate_profile_update(&body)?;
    let body = UpdateProfileRequest { name: body.name.map(|n| n.trim().to_string()), ..body };
    let updated = state
        .store
        .update_user(user.id, body)
        .ok_or_else(|| ApiError::NotFound("User not found.".into()))?;
    Ok(Json(ApiResponse::ok(UserProfile::from(&updated)).with_message("Profile updated.")))
}
