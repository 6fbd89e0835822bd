//! REST API handlers

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use ifgraph_core::WirePayload;
use ifgraph_indexer::{AnalysisError, Coordinator, Dialect, ErrorKind};
use serde::Serialize;

use crate::ServerState;
use crate::staging::StagedUpload;

/// Multipart field carrying the uploaded source.
pub const FILE_FIELD: &str = "file";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `{"error": ...}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err.kind() {
            ErrorKind::SourceUnreadable => {
                tracing::info!("Rejected upload: {}", err);
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ErrorKind::StagingIo => {
                tracing::error!("Staging failed: {}", err);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "File upload failed")
            }
            ErrorKind::Internal => {
                tracing::error!("Analysis failed: {}", err);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Analysis failed")
            }
        }
    }
}

/// Accept one TypeScript file and return its dependency views.
pub async fn upload(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Error reading multipart body: {}", e);
                return Err(ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "File upload failed",
                ));
            }
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.ts").to_string();
        match field.bytes().await {
            Ok(data) => {
                upload = Some((file_name, data));
                break;
            }
            Err(e) => {
                tracing::error!("Error reading uploaded file: {}", e);
                return Err(ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "File upload failed",
                ));
            }
        }
    }

    let Some((file_name, data)) = upload else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "No file uploaded"));
    };
    tracing::info!("Received {} ({} bytes)", file_name, data.len());

    let coordinator = Arc::clone(&state.coordinator);
    let upload_dir = state.upload_dir.clone();
    let payload = tokio::task::spawn_blocking(move || {
        analyze_upload(&coordinator, &upload_dir, &file_name, &data)
    })
    .await
    .map_err(|e| {
        tracing::error!("Analysis task failed: {}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Analysis failed")
    })??;

    let body = payload.to_json().map_err(AnalysisError::from)?;
    tracing::debug!("Responding with {} byte payload", body.len());
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Stage, analyze, and always remove the staged file.
pub fn analyze_upload(
    coordinator: &Coordinator,
    upload_dir: &Path,
    file_name: &str,
    data: &[u8],
) -> Result<WirePayload, AnalysisError> {
    let mut staged = StagedUpload::stage(upload_dir, file_name, data)?;
    let result = staged.read_to_end().map_err(AnalysisError::from).and_then(|bytes| {
        coordinator.build_payload_from_bytes(&bytes, Dialect::from_file_name(file_name))
    });
    staged.release();
    result
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(health)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::create_router;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use ifgraph_indexer::AnalyzerConfig;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "ifgraph-test-boundary";

    fn state(upload_dir: &Path) -> Arc<ServerState> {
        Arc::new(ServerState::new(
            AnalyzerConfig::default(),
            upload_dir.to_path_buf(),
            1024 * 1024,
        ))
    }

    fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(state: Arc<ServerState>, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = create_router(state).oneshot(request).await.unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn staged_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_upload_returns_payload_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let body = multipart_body("file", "types.ts", b"interface A { b: B }\ninterface B {}");

        let (status, json) = send(state(dir.path()), upload_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["treeData"][0]["id"], "A");
        assert_eq!(json["treeData"][0]["children"][0]["id"], "B");
        assert_eq!(json["graphData"]["links"][0]["source"], "A");
        assert_eq!(staged_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let dir = TempDir::new().unwrap();
        let body = multipart_body("attachment", "types.ts", b"interface A {}");

        let (status, json) = send(state(dir.path()), upload_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_truncated_multipart_is_upload_failure() {
        let dir = TempDir::new().unwrap();
        let body = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"").into_bytes();

        let (status, json) = send(state(dir.path()), upload_request(body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "File upload failed");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_unprocessable_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let body = multipart_body("file", "types.ts", &[0x69, 0xff, 0xfe, 0x00]);

        let (status, json) = send(state(dir.path()), upload_request(body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("UTF-8"));
        assert_eq!(staged_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_unusable_upload_dir_is_server_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not directory").unwrap();
        let body = multipart_body("file", "types.ts", b"interface A {}");

        let (status, json) = send(state(&blocker.join("uploads")), upload_request(body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "File upload failed");
    }

    #[tokio::test]
    async fn test_long_chain_upload_completes() {
        let dir = TempDir::new().unwrap();
        let source: String = (0..20_000)
            .map(|i| format!("interface T{i} {{ next: T{} }}\n", i + 1))
            .collect();
        let body = multipart_body("file", "chain.ts", source.as_bytes());

        let resp = create_router(state(dir.path()))
            .oneshot(upload_request(body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let payload = WirePayload::from_json(std::str::from_utf8(&bytes).unwrap()).unwrap();
        assert_eq!(payload.graph_data.links.len(), 19_999);
        assert_eq!(payload.decode_forest().unwrap().root_ids(), vec!["T0"]);
        assert_eq!(staged_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = TempDir::new().unwrap();
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(state(dir.path()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_analyze_upload_removes_staged_file() {
        let dir = TempDir::new().unwrap();
        let payload = analyze_upload(
            &Coordinator::default(),
            dir.path(),
            "cyclic.ts",
            b"interface Node { next: Node }",
        )
        .unwrap();
        assert!(payload.tree_data.is_empty());
        assert_eq!(staged_count(dir.path()), 0);
    }
}
