//! Process entry point: loads configuration, installs the schema, connects
//! the Backend Session, and runs the stdio tool-invocation loop.
//!
//! Flag parsing, environment loading, signal traps, and log-file rotation
//! are the process-level bootstrap spec §1 puts out of scope for the core;
//! this binary still has to exist to wire the core crates together, so it
//! stays as small as the teacher's own `memory-mcp-server.rs` bootstrap.

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use clap::Parser;
use memory_backend::{schema, BackendSession, SessionConfig};
use memory_core::config::Config;
use memory_embed::{EmbeddingClient, HttpEmbeddingClient};
use memory_mcp::server;
use memory_mcp::state::AppState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Overrides a handful of config values without requiring a config file to
/// locate (spec §1 process bootstrap is out of scope; flags here only ever
/// shadow the environment variables of spec §6's configuration surface).
#[derive(Parser, Debug)]
#[command(name = "memory-mcp-server")]
#[command(about = "Stdio tool-invocation protocol server for the agent memory service")]
struct Cli {
    /// Path to a `.env` file to load before reading the environment.
    #[arg(long)]
    env_file: Option<String>,

    /// Overrides `MEMORY_LOG_LEVEL`.
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let log_file = config
        .log_file
        .clone()
        .unwrap_or_else(|| Config::default_log_file("memory-mcp-server"));

    match OpenOptions::new().create(true).append(true).open(&log_file) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(move || file.try_clone().expect("log file handle clone"))
                .init();
        }
        Err(e) => {
            // Falls back to stderr so the tool protocol on stdout stays
            // uncontaminated even when the configured log file can't be
            // opened.
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
            error!(error = %e, path = %log_file, "failed to open log file, logging to stderr");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.env_file {
        dotenvy::from_filename(path).ok();
    } else {
        dotenvy::dotenv().ok();
    }

    let mut config = Config::from_env();
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    init_tracing(&config);
    info!(
        database_url = %config.database_url,
        namespace = %config.namespace,
        database = %config.database,
        "starting memory-mcp-server"
    );

    let session = Arc::new(BackendSession::new(SessionConfig::from(&config)));
    if let Err(e) = session.connect().await {
        error!(error = %e, "failed to connect to backend on startup");
        std::process::exit(1);
    }

    if let Err(e) = schema::install(&session, config.embedding_dimension).await {
        error!(error = %e, "schema install failed");
        std::process::exit(1);
    }

    let embed_client: Arc<dyn EmbeddingClient> = Arc::new(HttpEmbeddingClient::new(
        config.embedding_host.clone(),
        config.embedding_model.clone(),
        config.embedding_dimension,
    ));

    let state = Arc::new(AppState::new(&config, session, embed_client));

    info!("memory-mcp-server ready, entering stdio loop");
    if let Err(e) = server::run(state).await {
        error!(error = %e, "fatal error in stdio loop");
        std::process::exit(1);
    }

    info!("memory-mcp-server shutting down cleanly");
    Ok(())
}
