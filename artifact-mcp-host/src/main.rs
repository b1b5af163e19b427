//! Artifact MCP Host Server
//!
//! MCP server that publishes artifacts on a static web server.
//!
//! # Tools
//!
//! - `host_artifact` - Copy an artifact to the hosting directory and return its URL
//!
//! # Usage
//!
//! ```bash
//! # Run with stdio transport (default)
//! artifact-mcp-host
//!
//! # Serve hosted files on port 9000 and MCP over HTTP on 8080
//! artifact-mcp-host --host-port 9000 --transport http --port 8080
//! ```

use std::path::PathBuf;

use anyhow::Result;
use artifact_mcp_common::artifact::ToolContext;
use artifact_mcp_common::{Config, McpServerBuilder, TransportArgs, store, tracing::init_tracing};
use artifact_mcp_host::{HostHandler, HostServer, HostingServer};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "artifact-mcp-host")]
#[command(about = "MCP server that publishes artifacts on a static web server")]
#[command(version)]
struct Args {
    #[command(flatten)]
    transport: TransportArgs,

    /// Port of the hosting web server (overrides HOST_PORT)
    #[arg(long)]
    host_port: Option<u16>,

    /// Directory served by the hosting web server (overrides HOST_DIRECTORY)
    #[arg(long)]
    host_directory: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(port) = args.host_port {
        config.host_port = port;
    }
    if let Some(dir) = args.host_directory {
        config.host_directory = dir;
    }

    tracing::info!(
        app_name = %config.app_name,
        host_directory = %config.host_directory.display(),
        "Starting artifact-mcp-host server"
    );

    // A hosting server that fails to start leaves the tool reporting a
    // configuration error instead of taking the MCP server down.
    let target = match HostingServer::bind(
        config.host_directory.clone(),
        &config.host_bind,
        config.host_port,
        config.base_url.clone(),
    )
    .await
    {
        Ok(hosting) => {
            let target = hosting.target().clone();
            hosting.spawn();
            Some(target)
        }
        Err(e) => {
            tracing::error!(error = %e, "Hosting web server failed to start");
            None
        }
    };

    let artifacts = store::connect(&config).await?;
    let context = ToolContext::new(config.scope(), artifacts);
    let server = HostServer::new(HostHandler::new(target), Some(context));

    McpServerBuilder::new(server)
        .with_transport(args.transport.into_transport())
        .run()
        .await?;

    Ok(())
}
