//! Connect 4 move server
//!
//! Serves `POST /get-move` for the browser frontend.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use connect4_minimax::server::{serve, ServerConfig};

/// Serve engine moves over HTTP
#[derive(Parser)]
#[command(name = "server", about = "Serve Connect 4 engine moves over HTTP")]
struct Cli {
    /// Address to bind to
    #[arg(long, env = "CONNECT4_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "CONNECT4_PORT", default_value_t = 8000)]
    port: u16,

    /// Deepest search a request may ask for
    #[arg(long, env = "CONNECT4_MAX_DEPTH", default_value_t = 8)]
    max_depth: u32,

    /// Abort searches visiting more nodes than this
    #[arg(long, env = "CONNECT4_MAX_NODES")]
    max_nodes: Option<usize>,

    /// Abort searches running longer than this many milliseconds
    #[arg(long, env = "CONNECT4_TIME_LIMIT_MS")]
    time_limit_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("connect4_minimax=info,server=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig {
        host: cli.host,
        port: cli.port,
        max_depth: cli.max_depth,
        ..ServerConfig::default()
    };
    config.engine.limits.max_nodes = cli.max_nodes;
    config.engine.limits.time_limit = cli.time_limit_ms.map(std::time::Duration::from_millis);

    serve(config).await
}
