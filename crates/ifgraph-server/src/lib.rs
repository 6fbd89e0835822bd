//! HTTP surface: upload a TypeScript file, get its dependency views back

pub mod handlers;
pub mod router;
pub mod staging;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use ifgraph_indexer::{AnalyzerConfig, Coordinator};

/// Default request-body ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// State shared by every request handler.
///
/// Read-only: each request stages and analyzes its own input.
#[derive(Debug)]
pub struct ServerState {
    pub coordinator: Arc<Coordinator>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl ServerState {
    pub fn new(analyzer: AnalyzerConfig, upload_dir: PathBuf, max_upload_bytes: usize) -> Self {
        Self {
            coordinator: Arc::new(Coordinator::new(analyzer)),
            upload_dir,
            max_upload_bytes,
        }
    }
}

pub struct IfgraphServer {
    config: ServerConfig,
    state: Arc<ServerState>,
}

impl IfgraphServer {
    pub fn new(analyzer: AnalyzerConfig, config: ServerConfig) -> Self {
        let state = Arc::new(ServerState::new(
            analyzer,
            config.upload_dir.clone(),
            config.max_upload_bytes,
        ));
        Self { config, state }
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> anyhow::Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.config.host, self.config.port))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        tracing::info!("Listening on http://{}", addr);
        tracing::info!("Staging uploads in {}", self.config.upload_dir.display());

        let app = router::create_router(self.state);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
