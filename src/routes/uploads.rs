use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::error::ApiError;
use crate::storage::content_type_for;

pub async fn serve_upload(State(state): State<AppState>, Path(path): Path<String>) -> Result<Response, ApiError> {
    if !state.storage.exists(&path).await? {
        return Err(ApiError::NotFound("File not found.".into()));
    }
    let bytes = state.storage.download(&path).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&path)),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestApp;
    use axum::http::{header, Method, StatusCode};
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn stored_files_are_served_with_content_type() {
        let app = TestApp::new();
        app.state
            .storage
            .upload(Bytes::from_static(b"jpeg-bytes"), "u1/p1/inputs/a.jpg", "image/jpeg")
            .await
            .unwrap();

        let (status, bytes, headers) = app.raw_request(Method::GET, "/api/uploads/u1/p1/inputs/a.jpg", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"jpeg-bytes");
        assert_eq!(headers[header::CONTENT_TYPE], "image/jpeg");
        assert!(headers[header::CACHE_CONTROL].to_str().unwrap().contains("max-age=31536000"));
    }

    #[tokio::test]
    async fn missing_and_escaping_paths() {
        let app = TestApp::new();
        let (status, body) = app.request(Method::GET, "/api/uploads/u1/none.png", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, _) = app.request(Method::GET, "/api/uploads/u1/%2E%2E/%2E%2E/etc/passwd", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn directories_are_not_served() {
        let app = TestApp::new();
        app.state
            .storage
            .upload(Bytes::from_static(b"png"), "u1/p1/a.png", "image/png")
            .await
            .unwrap();

        for uri in ["/api/uploads/u1", "/api/uploads/u1/p1"] {
            let (status, body) = app.request(Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["success"], false);
        }
    }
}
