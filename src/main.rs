//! ifgraph CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "ifgraph")]
#[command(about = "Dependency views of TypeScript interface declarations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Analyzer config file (defaults to ifgraph.{toml,yaml,yml,json} in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one TypeScript file and print its payload
    Analyze {
        /// Source file (.ts, .d.ts, .tsx)
        file: PathBuf,

        /// Write the payload here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Start the upload server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory uploaded files are staged in
        #[arg(long, default_value = "uploads")]
        upload_dir: PathBuf,

        /// Largest accepted request body, in bytes
        #[arg(long, default_value_t = ifgraph_server::DEFAULT_MAX_UPLOAD_BYTES)]
        max_upload_bytes: usize,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env is optional
    let dotenv = dotenvy::dotenv().ok();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("ifgraph={log_level}")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    match cli.command {
        Commands::Analyze {
            file,
            output,
            pretty,
        } => {
            let analyzer = commands::load_config(cli.config.as_deref())?;
            commands::analyze(analyzer, &file, output.as_deref(), pretty)
        }
        Commands::Serve {
            port,
            host,
            upload_dir,
            max_upload_bytes,
        } => {
            let analyzer = commands::load_config(cli.config.as_deref())?;
            let server = ifgraph_server::ServerConfig {
                host,
                port,
                upload_dir,
                max_upload_bytes,
            };
            commands::serve(analyzer, server).await
        }
        Commands::Version => {
            println!("ifgraph v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
