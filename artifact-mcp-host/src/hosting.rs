//! The static web-hosting collaborator.
//!
//! [`HostingServer`] serves `GET /<filename>` straight out of one directory.
//! [`HostingTarget`] is the part the tool needs: where to write files and how
//! to turn a file name into a public URL.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use artifact_mcp_common::content_type;
use artifact_mcp_common::error::{Error, Result};
use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Hosting directory plus the base URL files in it are reachable under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostingTarget {
    pub directory: PathBuf,
    pub base_url: String,
}

impl HostingTarget {
    pub fn new(directory: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            base_url: base_url.into(),
        }
    }

    /// Public URL of `filename`, using `base_url_override` instead of the
    /// configured base when given.
    ///
    /// ```
    /// use artifact_mcp_host::hosting::HostingTarget;
    ///
    /// let target = HostingTarget::new("/srv/www", "http://localhost:8081/");
    /// assert_eq!(target.build_url("my chart.png", None), "http://localhost:8081/my%20chart.png");
    /// assert_eq!(
    ///     target.build_url("a.png", Some("https://cdn.example.com/files")),
    ///     "https://cdn.example.com/files/a.png"
    /// );
    /// ```
    pub fn build_url(&self, filename: &str, base_url_override: Option<&str>) -> String {
        let base = base_url_override.unwrap_or(&self.base_url);
        format!("{}/{}", base.trim_end_matches('/'), urlencoding::encode(filename))
    }

    /// Where `filename` lives on disk.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.directory.join(filename)
    }
}

/// Check that `filename` is one plain path component.
///
/// # Errors
/// Returns `Error::Validation` for empty names, `.`/`..`, and names containing
/// a path separator or NUL.
pub fn validate_hosted_filename(filename: &str) -> Result<()> {
    if filename.trim().is_empty() {
        return Err(Error::validation("hosted filename cannot be empty"));
    }
    if filename == "." || filename == ".." {
        return Err(Error::validation(format!("'{}' is not a valid hosted filename", filename)));
    }
    if filename.contains(['/', '\\', '\0']) {
        return Err(Error::validation(format!(
            "hosted filename '{}' must not contain path separators; pass custom_filename to rename it",
            filename
        )));
    }
    Ok(())
}

/// A bound static file server.
#[derive(Debug)]
pub struct HostingServer {
    listener: TcpListener,
    target: HostingTarget,
}

impl HostingServer {
    /// Create the hosting directory and bind `bind:port`.
    ///
    /// Without `base_url` the public base is derived from the bound address,
    /// with wildcard addresses reported as `localhost`.
    ///
    /// # Errors
    /// Returns `Error::Io` if the directory cannot be created or the address
    /// cannot be bound.
    pub async fn bind(directory: impl Into<PathBuf>, bind: &str, port: u16, base_url: Option<String>) -> Result<Self> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await?;

        let listener = TcpListener::bind((bind, port)).await?;
        let addr = listener.local_addr()?;
        let base_url = base_url.unwrap_or_else(|| default_base_url(addr));

        info!(directory = %directory.display(), addr = %addr, base_url = %base_url, "Hosting server bound");

        Ok(Self {
            listener,
            target: HostingTarget::new(directory, base_url),
        })
    }

    pub fn target(&self) -> &HostingTarget {
        &self.target
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        let app = router(self.target.directory);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    /// Serve on a background task for the rest of the process.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.serve(std::future::pending()).await {
                warn!(error = %e, "Hosting server stopped");
            }
        })
    }
}

fn default_base_url(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("http://localhost:{}", addr.port())
    } else {
        format!("http://{}", addr)
    }
}

/// Routes of the static file server rooted at `directory`.
pub fn router(directory: PathBuf) -> Router {
    Router::new()
        .route("/{filename}", get(serve_file))
        .with_state(Arc::new(directory))
}

async fn serve_file(State(directory): State<Arc<PathBuf>>, UrlPath(filename): UrlPath<String>) -> Response {
    if validate_hosted_filename(&filename).is_err() {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path: &Path = directory.as_ref();
    match tokio::fs::read(path.join(&filename)).await {
        Ok(bytes) => {
            debug!(filename = %filename, bytes = bytes.len(), "Serving hosted file");
            ([(header::CONTENT_TYPE, content_type::from_path(&filename))], bytes).into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!(filename = %filename, error = %e, "Failed to read hosted file");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
