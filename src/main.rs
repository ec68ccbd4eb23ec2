//! Decibel MCP server - main entry point.
//!
//! Transports:
//! - `stdio`: newline-delimited JSON-RPC on stdin/stdout (default)
//! - `http`: `POST /mcp` plus the daemon contract (`/health`, `/call`)
//! - `bridge`: stdio, proxying calls to `--daemon-url` with local fallback

use clap::{Parser, ValueEnum};
use decibel_mcp::bridge::BridgeAdapter;
use decibel_mcp::transport::{HttpTransport, McpRouter, StdioTransport, ToolService};
use decibel_mcp::{catalog, Config};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Http,
    Bridge,
}

#[derive(Debug, Parser)]
#[command(name = "decibel-mcp", version, about = "Decibel tool kernel MCP server")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, env = "DECIBEL_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "stdio")]
    transport: Transport,

    /// HTTP bind address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Daemon base URL for the bridge (overrides config).
    #[arg(long)]
    daemon_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration: file, then env, then flags
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen;
    }
    if let Some(url) = cli.daemon_url {
        config.bridge.daemon_url = Some(url);
    }

    decibel_mcp::observability::init_tracing(&config.observability);

    let kernel = Arc::new(catalog::builtin()?);
    let tier = config.catalog.default_tier;

    match cli.transport {
        Transport::Stdio => {
            let transport = StdioTransport::new(McpRouter::new(kernel, tier));
            run_stdio(transport).await?;
        }
        Transport::Bridge => {
            let adapter = Arc::new(BridgeAdapter::start(kernel, &config.bridge).await?);
            let service: Arc<dyn ToolService> = adapter.clone();
            let transport = StdioTransport::new(McpRouter::new(service, tier));
            run_stdio(transport).await?;
            adapter.shutdown();
        }
        Transport::Http => {
            let addr: SocketAddr = config.server.listen_addr.parse()?;
            let transport = Arc::new(HttpTransport::new(McpRouter::new(kernel, tier), addr));
            let signal = Arc::clone(&transport);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("interrupt received");
                    signal.shutdown();
                }
            });
            transport.serve().await?;
        }
    }

    Ok(())
}

async fn run_stdio(transport: StdioTransport) -> std::io::Result<()> {
    let transport = Arc::new(transport);
    let signal = Arc::clone(&transport);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            signal.shutdown();
        }
    });
    transport.serve_stdio().await
}
