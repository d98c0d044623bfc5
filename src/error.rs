use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::AuthError;
use crate::provider::ProviderError;
use crate::storage::StorageError;
use crate::store::StoreError;

/// Envelope for every JSON body the API returns.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, message: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self { success: true, data: None, error: None, message: Some(message.into()) }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()), message: None }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("image generation failed: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Internal(detail) => {
                error!("❌ Internal error: {}", detail);
                "Internal server error.".to_string()
            }
            ApiError::Upstream(detail) => {
                error!("❌ Upstream failure: {}", detail);
                self.to_string()
            }
            other => {
                warn!("Request rejected ({}): {}", status, other);
                other.to_string()
            }
        };
        (status, Json(ApiResponse::failure(message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Decode(detail) => ApiError::Validation(format!("invalid image data: {detail}")),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::InvalidPath(path) => ApiError::Validation(format!("invalid file path: {path}")),
            StorageError::NotFound(path) => ApiError::NotFound(format!("file not found: {path}")),
            StorageError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MalformedHash => ApiError::Internal(e.to_string()),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => ApiError::Conflict("Email is already in use.".into()),
        }
    }
}

/// `Json` whose rejections use the API envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn errors_render_envelope_with_status() {
        let response = ApiError::Forbidden("Not your project.".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "success": false, "error": "Not your project." })
        );
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let response = ApiError::Internal("disk on fire at /var/data".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Internal server error.");
    }

    #[test]
    fn layer_errors_map_to_statuses() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (ProviderError::Exhausted(2).into(), StatusCode::BAD_GATEWAY),
            (ProviderError::Decode("bad".into()).into(), StatusCode::BAD_REQUEST),
            (StorageError::InvalidPath("../x".into()).into(), StatusCode::BAD_REQUEST),
            (StorageError::NotFound("x".into()).into(), StatusCode::NOT_FOUND),
            (AuthError::MalformedHash.into(), StatusCode::INTERNAL_SERVER_ERROR),
            (StoreError::DuplicateEmail.into(), StatusCode::CONFLICT),
        ];
        for (error, status) in cases {
            assert_eq!(error.status_code(), status, "{error:?}");
        }
    }

    #[test]
    fn success_envelope_skips_empty_fields() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2]).with_message("done")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": [1, 2], "message": "done" }));

        let json = serde_json::to_value(ApiResponse::message("Logged out.")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "message": "Logged out." }));
    }
}
