pub mod health;

use axum::{http::Uri, routing::get, Router};

use crate::errors::AppError;
use crate::export::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/cv/formats", get(handlers::handle_list_formats))
        .route("/api/v1/cv/:format", get(handlers::handle_export))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::source::{FileSource, RecordLoader};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use std::path::Path;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BUNDLED: &str = include_str!("../../data/cv-data.json");

    fn app_for(path: &Path) -> Router {
        let loader = RecordLoader::new(Arc::new(FileSource::new(path)));
        build_router(AppState::new(Config::default(), loader))
    }

    async fn send_get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().expect("temp dir");
        let response = send_get(app_for(&dir.path().join("cv.json")), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "cv-api");
    }

    #[tokio::test]
    async fn test_export_returns_pdf_attachment() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("cv.json");
        std::fs::write(&path, BUNDLED).expect("write");

        let response = send_get(app_for(&path), "/api/v1/cv/resume").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Artemio_Padilla_Resume.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_unknown_format_is_validation_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("cv.json");
        std::fs::write(&path, BUNDLED).expect("write");

        let response = send_get(app_for(&path), "/api/v1/cv/poster").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_data_is_service_unavailable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let response = send_get(app_for(&dir.path().join("absent.json")), "/api/v1/cv/full").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "DATA_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_formats_listing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("cv.json");
        std::fs::write(&path, BUNDLED).expect("write");

        let response = send_get(app_for(&path), "/api/v1/cv/formats").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let formats = body["formats"].as_array().expect("formats array");
        assert_eq!(formats.len(), 3);
        assert_eq!(formats[0]["format"], "full");
        assert_eq!(formats[1]["label"], "Resume");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let response = send_get(app_for(&dir.path().join("cv.json")), "/api/v2/cv").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "no route for /api/v2/cv");
    }

    #[tokio::test]
    async fn test_formats_listing_without_data_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let response = send_get(app_for(&dir.path().join("absent.json")), "/api/v1/cv/formats").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["formats"][2]["description"], "1-page executive summary");
    }
}
