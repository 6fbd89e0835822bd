//! CLI command implementations

use std::path::Path;

use anyhow::Context;
use ifgraph_indexer::{AnalyzerConfig, Coordinator};
use ifgraph_server::{IfgraphServer, ServerConfig};

/// Explicit config file, or discovery in the working directory, then
/// environment overrides.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AnalyzerConfig> {
    let config = match path {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir()?;
            AnalyzerConfig::discover(&cwd)?
        }
    };
    let config = config.with_env_overrides();
    tracing::debug!("Analyzer config: {:?}", config);
    Ok(config)
}

pub fn analyze(
    config: AnalyzerConfig,
    file: &Path,
    output: Option<&Path>,
    pretty: bool,
) -> anyhow::Result<()> {
    tracing::info!("Analyzing {}", file.display());

    let payload = Coordinator::new(config)
        .build_payload_from_file(file)
        .with_context(|| format!("failed to analyze {}", file.display()))?;

    let json = if pretty {
        payload.to_json_pretty()?
    } else {
        payload.to_json()?
    };

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Wrote {} bytes to {}", json.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub async fn serve(analyzer: AnalyzerConfig, config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting ifgraph server on {}:{}", config.host, config.port);
    IfgraphServer::new(analyzer, config).start().await
}
