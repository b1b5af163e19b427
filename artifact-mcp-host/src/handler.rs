//! Artifact hosting handler.
//!
//! Copies one version of an artifact into the hosting directory and reports the
//! URL it can be fetched from.

use std::path::Path;

use artifact_mcp_common::artifact::{ArtifactRef, ToolContext, resolve};
use artifact_mcp_common::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::hosting::{HostingTarget, validate_hosted_filename};

/// Parameters of the `host_artifact` tool.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct HostArtifactParams {
    /// Artifact filename with optional version, e.g. "photo.jpg" or "photo.jpg:2".
    pub artifact_filename: String,

    /// Name for the hosted file. Defaults to the artifact name; when it has no
    /// extension the artifact's extension is appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_filename: Option<String>,

    /// Base URL to build the returned URL from, for proxies and firewalls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// A successfully hosted artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedArtifact {
    pub artifact_filename: String,
    pub artifact_version: u64,
    pub hosted_filename: String,
    pub url: String,
}

/// Publishes artifacts into a [`HostingTarget`].
#[derive(Debug, Clone, Default)]
pub struct HostHandler {
    target: Option<HostingTarget>,
}

impl HostHandler {
    /// `target` is `None` when the hosting web server did not start; every
    /// call then fails with a configuration error.
    pub fn new(target: Option<HostingTarget>) -> Self {
        Self { target }
    }

    pub fn target(&self) -> Option<&HostingTarget> {
        self.target.as_ref()
    }

    /// Host an artifact.
    ///
    /// # Errors
    /// - `Error::Configuration` without a tool context or hosting target
    /// - `Error::Validation` for an empty reference or an unusable hosted name
    /// - `Error::NotFound` if the artifact or version does not exist
    /// - `Error::Io` if the file cannot be written
    #[instrument(level = "info", name = "host_artifact", skip_all, fields(artifact = %params.artifact_filename))]
    pub async fn host(&self, params: HostArtifactParams, ctx: Option<&ToolContext>) -> Result<HostedArtifact> {
        info!("Hosting artifact");

        let ctx = ctx.ok_or_else(|| Error::configuration("ToolContext is required"))?;
        let target = self.target.as_ref().ok_or_else(|| {
            Error::configuration("Web server is not running. Please check agent configuration.")
        })?;

        let reference = ArtifactRef::parse(&params.artifact_filename)?;
        let artifact = resolve(ctx.artifacts.as_ref(), &ctx.scope, &reference).await?;
        debug!(version = artifact.version, bytes = artifact.data.len(), "Loaded artifact");

        let custom = params.custom_filename.as_deref().filter(|name| !name.is_empty());
        let hosted_filename = hosted_filename(&artifact.name, custom);
        validate_hosted_filename(&hosted_filename)?;

        let path = write_atomic(target, &hosted_filename, &artifact.data).await?;
        info!(path = %path.display(), "Artifact written");

        let url = target.build_url(&hosted_filename, params.base_url.as_deref());
        info!(url = %url, "Artifact hosted successfully");

        Ok(HostedArtifact {
            artifact_filename: artifact.name,
            artifact_version: artifact.version,
            hosted_filename,
            url,
        })
    }
}

/// Name the hosted copy of `artifact_name` gets.
///
/// A custom name without any `.` inherits the artifact's extension.
///
/// ```
/// use artifact_mcp_host::handler::hosted_filename;
///
/// assert_eq!(hosted_filename("chart.png", None), "chart.png");
/// assert_eq!(hosted_filename("chart.png", Some("q3")), "q3.png");
/// assert_eq!(hosted_filename("chart.png", Some("q3.jpeg")), "q3.jpeg");
/// assert_eq!(hosted_filename("README", Some("docs")), "docs");
/// ```
pub fn hosted_filename(artifact_name: &str, custom_filename: Option<&str>) -> String {
    match custom_filename {
        None => artifact_name.to_string(),
        Some(custom) if custom.contains('.') => custom.to_string(),
        Some(custom) => match Path::new(artifact_name).extension().and_then(|e| e.to_str()) {
            Some(ext) if !ext.is_empty() => format!("{}.{}", custom, ext),
            _ => custom.to_string(),
        },
    }
}

/// Write `data` to the hosted `filename` through a uniquely named temporary file
/// and a rename, so readers and concurrent writers never see a partial file.
///
/// The staging name has a fixed length so any name the directory accepts can
/// be hosted.
async fn write_atomic(target: &HostingTarget, filename: &str, data: &[u8]) -> Result<std::path::PathBuf> {
    let destination = target.path_for(filename);
    let staging = target.path_for(&format!(".{}.tmp", Uuid::new_v4()));

    tokio::fs::write(&staging, data).await?;
    if let Err(e) = tokio::fs::rename(&staging, &destination).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e.into());
    }
    Ok(destination)
}
