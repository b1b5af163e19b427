//! Running an MCP tool server on the configured transport.
//!
//! ```ignore
//! use artifact_mcp_common::server::McpServerBuilder;
//! use artifact_mcp_common::transport::Transport;
//!
//! McpServerBuilder::new(handler)
//!     .with_transport(Transport::stdio())
//!     .run()
//!     .await?;
//! ```

use std::future::Future;

use rmcp::{ServerHandler, ServiceExt};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::transport::Transport;

/// Errors that can occur when running an MCP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind the listening socket
    #[error("Failed to bind to {addr}: {message}")]
    BindFailed { addr: String, message: String },

    /// Transport error during communication
    #[error("Transport error: {0}")]
    Transport(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builder for configuring and running MCP servers.
pub struct McpServerBuilder<H> {
    handler: H,
    transport: Transport,
    shutdown_rx: Option<oneshot::Receiver<()>>,
}

impl<H> McpServerBuilder<H>
where
    H: ServerHandler + Clone + Send + Sync + 'static,
{
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            transport: Transport::default(),
            shutdown_rx: None,
        }
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Stop when `shutdown_rx` fires or its sender is dropped, instead of on
    /// SIGINT/SIGTERM.
    pub fn with_shutdown(mut self, shutdown_rx: oneshot::Receiver<()>) -> Self {
        self.shutdown_rx = Some(shutdown_rx);
        self
    }

    /// Serve until the client disconnects (stdio) or shutdown is requested.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!(transport = %self.transport, "Starting MCP server");

        let shutdown = shutdown_future(self.shutdown_rx);
        match self.transport {
            Transport::Stdio => run_stdio(self.handler, shutdown).await,
            Transport::Http { bind, port } => run_http(self.handler, &bind, port, shutdown).await,
        }
    }
}

async fn run_stdio<H>(handler: H, shutdown: impl Future<Output = ()>) -> Result<(), ServerError>
where
    H: ServerHandler,
{
    let service = handler
        .serve(rmcp::transport::io::stdio())
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    tokio::select! {
        result = service.waiting() => {
            result.map_err(|e| ServerError::Transport(e.to_string()))?;
            tracing::info!("Client disconnected");
        }
        _ = shutdown => {
            tracing::info!("Received shutdown signal, stopping server");
        }
    }
    Ok(())
}

async fn run_http<H>(
    handler: H,
    bind: &str,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError>
where
    H: ServerHandler + Clone + Send + Sync + 'static,
{
    use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};

    let service = StreamableHttpService::new(
        move || Ok(handler.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service("/mcp", service);

    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::BindFailed {
            addr: addr.clone(),
            message: e.to_string(),
        })?;

    tracing::info!(addr = %addr, "MCP HTTP endpoint listening at /mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

fn shutdown_future(rx: Option<oneshot::Receiver<()>>) -> impl Future<Output = ()> + Send + 'static {
    async move {
        match rx {
            Some(rx) => {
                let _ = rx.await;
            }
            None => wait_for_shutdown_signal().await,
        }
    }
}

/// Wait for SIGTERM or SIGINT (Ctrl+C elsewhere).
///
/// If the handlers cannot be installed this never resolves and the server
/// runs until killed.
pub async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (mut sigterm, mut sigint) = match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Could not install signal handlers");
                return std::future::pending().await;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
            _ = sigint.recv() => tracing::info!("Received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Could not install Ctrl+C handler");
            return std::future::pending().await;
        }
        tracing::info!("Received Ctrl+C");
    }
}

/// Channel for triggering shutdown programmatically; pass the receiver to
/// [`McpServerBuilder::with_shutdown`].
pub fn shutdown_channel() -> (oneshot::Sender<()>, oneshot::Receiver<()>) {
    oneshot::channel()
}
