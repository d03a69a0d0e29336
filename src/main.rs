//! Runs the MCP gateway HTTP server.
//!
//! Usage:
//!
//! ```text
//! mcp-gateway [--config <path>] [--port <port>] [--bind <addr>]
//! ```
//!
//! Every server in the configuration file is launched and connected before
//! the listener binds. A server that fails to start is logged and left out;
//! only a registration batch that outlives its timeout stops the gateway
//! from serving.

use camino::Utf8PathBuf;
use clap::Parser;
use mcp_gateway::{
    config,
    gateway::{
        adapters::StdioConnectionRegistry,
        domain::GatewayTimeouts,
        services::{BringUpOrchestrator, DispatchService, ToolCache},
    },
    http,
};
use mockable::DefaultClock;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_LOG_FILTER: &str = "info,mcp_gateway=debug";

#[derive(Debug, Parser)]
#[command(name = "mcp-gateway", version)]
#[command(about = "HTTP gateway for MCP tool servers")]
struct Cli {
    /// MCP server configuration file
    #[arg(long, env = "MCP_GATEWAY_CONFIG", default_value = config::DEFAULT_CONFIG_PATH)]
    config: Utf8PathBuf,

    /// Port to listen on
    #[arg(long, env = "MCP_GATEWAY_PORT", default_value_t = 9090)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,

    /// Seconds allowed for connecting all servers at startup
    #[arg(long, default_value_t = 60)]
    registration_timeout_secs: u64,

    /// Seconds allowed for listing one server's tools
    #[arg(long, default_value_t = 10)]
    discovery_timeout_secs: u64,

    /// Seconds allowed for one tool call
    #[arg(long, default_value_t = 30)]
    invocation_timeout_secs: u64,
}

impl Cli {
    const fn timeouts(&self) -> GatewayTimeouts {
        GatewayTimeouts {
            registration: Duration::from_secs(self.registration_timeout_secs),
            discovery: Duration::from_secs(self.discovery_timeout_secs),
            invocation: Duration::from_secs(self.invocation_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::registry()
        .with(fmt::layer().compact())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let timeouts = cli.timeouts();
    let catalog = Arc::new(config::load_catalog(&cli.config)?);

    let registry = Arc::new(StdioConnectionRegistry::new());
    let cache = Arc::new(ToolCache::new(
        Arc::clone(&registry),
        Arc::new(DefaultClock),
        catalog.names().cloned(),
    ));
    BringUpOrchestrator::new(Arc::clone(&registry), Arc::clone(&cache), timeouts)
        .bring_up(&catalog)
        .await?;

    let dispatch = Arc::new(DispatchService::new(
        catalog,
        Arc::clone(&registry),
        cache,
        timeouts,
    ));
    let addr = SocketAddr::new(cli.bind, cli.port);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "MCP gateway listening");

    axum::serve(listener, http::router(dispatch))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.shutdown().await;
    info!("MCP gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(err) => {
            warn!(error = %err, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
