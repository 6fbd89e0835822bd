//! Integration tests for ifgraph
//!
//! These tests drive the binary and the HTTP router end to end.

use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use ifgraph_core::WirePayload;
use ifgraph_indexer::{AnalyzerConfig, Coordinator, Dialect};
use ifgraph_server::ServerState;
use tempfile::TempDir;
use tower::ServiceExt;

const CMS_TYPES: &str = r#"
export interface PublishDetails { environment: string }
export interface File { url: string; publish_details: PublishDetails }
export interface Link { title: string; href: string }

export interface Page {
  title: string;
  hero?: Banner;
  sections: Section[];
  seo: Seo;
}

export interface Banner { image: File; cta: Link; theme: Theme }
export interface Section { blocks: Array<Block>; theme: Theme }
export interface Block { kind: "text" | "image"; banner?: Banner }
export interface Theme { accent: string }
export interface Seo { title: string }
"#;

fn ifgraph(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ifgraph"))
        .args(args)
        .current_dir(dir)
        .env_remove("IFGRAPH_IGNORE_LIST")
        .env_remove("IFGRAPH_FOLLOW_HERITAGE")
        .env_remove("IFGRAPH_STRICT_SYNTAX")
        .output()
        .expect("Failed to execute ifgraph")
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = ifgraph(dir.path(), &["--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Dependency views of TypeScript interface declarations"));
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("serve"));
}

#[test]
fn test_cli_analyze_writes_payload() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("cms.d.ts"), CMS_TYPES).unwrap();

    let output = ifgraph(dir.path(), &["analyze", "cms.d.ts", "--output", "out.json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
    let payload = WirePayload::from_json(&json).unwrap();
    let forest = payload.decode_forest().unwrap();

    assert_eq!(forest.root_ids(), vec!["Page"]);
    assert!(!json.contains("PublishDetails"));
    assert!(payload.graph_data.has_link("Banner", "Theme"));
    assert!(payload.graph_data.has_link("Block", "Banner"));
}

#[test]
fn test_cli_config_file_replaces_ignore_list() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("cms.ts"), CMS_TYPES).unwrap();
    std::fs::write(dir.path().join("ifgraph.toml"), "ignore_list = [\"Seo\"]\n").unwrap();

    let output = ifgraph(dir.path(), &["analyze", "cms.ts"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let payload = WirePayload::from_json(&String::from_utf8_lossy(&output.stdout)).unwrap();
    let nodes = payload.graph_data.node_ids();
    assert!(nodes.contains(&"File"));
    assert!(!nodes.contains(&"Seo"));
    assert!(payload.graph_data.has_link("File", "PublishDetails"));
}

#[test]
fn test_cli_analyze_rejects_binary_input() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("blob.ts"), [0xde, 0xad, 0xbe, 0xef]).unwrap();

    let output = ifgraph(dir.path(), &["analyze", "blob.ts"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("source unreadable"));
}

#[test]
fn test_pipeline_shared_nodes_survive_round_trip() {
    let coordinator = Coordinator::new(AnalyzerConfig::default());
    let views = coordinator.build_views(CMS_TYPES, Dialect::TypeScript).unwrap();
    let original_shape = views.forest.canonical_shape();

    let json = views.into_payload().unwrap().to_json().unwrap();
    let decoded = WirePayload::from_json(&json).unwrap().decode_forest().unwrap();
    assert_eq!(decoded.canonical_shape(), original_shape);

    // Theme is reachable through Banner and Section but exists once
    let theme = decoded.find("Theme").unwrap();
    let banner = decoded.find("Banner").unwrap();
    let section = decoded.find("Section").unwrap();
    assert!(decoded.node(banner).unwrap().children.contains(&theme));
    assert!(decoded.node(section).unwrap().children.contains(&theme));
}

#[tokio::test]
async fn test_server_upload_round_trip() {
    let uploads = TempDir::new().unwrap();
    let state = Arc::new(ServerState::new(
        AnalyzerConfig::default(),
        uploads.path().to_path_buf(),
        ifgraph_server::DEFAULT_MAX_UPLOAD_BYTES,
    ));

    let boundary = "integration-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cms.ts\"\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(CMS_TYPES.as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let resp = ifgraph_server::router::create_router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let payload: WirePayload = serde_json::from_slice(&bytes).unwrap();
    let direct = Coordinator::default()
        .build_payload(CMS_TYPES, Dialect::TypeScript)
        .unwrap();
    assert_eq!(payload.to_json().unwrap(), direct.to_json().unwrap());

    assert_eq!(std::fs::read_dir(uploads.path()).unwrap().count(), 0);
}
