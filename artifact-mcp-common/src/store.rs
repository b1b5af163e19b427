//! Artifact service backends.
//!
//! - [`InMemoryArtifactService`]: process-local, versions start at 0.
//! - [`GcsArtifactService`]: objects stored as
//!   `<app>/<user>/<session>/<filename>/<version>` in a bucket, with `user:`
//!   names under `<app>/<user>/user/<filename>/<version>`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::artifact::{Artifact, ArtifactScope, ArtifactService};
use crate::auth::AuthProvider;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::gcs::{GcsClient, GcsUri};

/// Artifact storage that lives for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryArtifactService {
    artifacts: RwLock<HashMap<String, Vec<Artifact>>>,
}

impl InMemoryArtifactService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactService for InMemoryArtifactService {
    async fn list_versions(&self, scope: &ArtifactScope, filename: &str) -> Result<Vec<u64>> {
        let artifacts = self.artifacts.read().await;
        let count = artifacts
            .get(&scope.object_prefix(filename))
            .map_or(0, |versions| versions.len() as u64);
        Ok((0..count).collect())
    }

    async fn load_artifact(
        &self,
        scope: &ArtifactScope,
        filename: &str,
        version: u64,
    ) -> Result<Option<Artifact>> {
        let artifacts = self.artifacts.read().await;
        Ok(artifacts
            .get(&scope.object_prefix(filename))
            .and_then(|versions| versions.get(version as usize))
            .cloned())
    }

    async fn save_artifact(&self, scope: &ArtifactScope, filename: &str, artifact: Artifact) -> Result<u64> {
        let mut artifacts = self.artifacts.write().await;
        let versions = artifacts.entry(scope.object_prefix(filename)).or_default();
        versions.push(artifact);
        Ok(versions.len() as u64 - 1)
    }
}

/// Saves give up after this many version collisions.
const MAX_SAVE_ATTEMPTS: usize = 5;

/// Artifact storage in a GCS bucket.
#[derive(Debug)]
pub struct GcsArtifactService {
    client: GcsClient,
    bucket: String,
}

impl GcsArtifactService {
    pub fn new(client: GcsClient, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    fn location(&self, scope: &ArtifactScope, filename: &str, version: u64) -> GcsUri {
        GcsUri::new(&self.bucket, format!("{}/{}", scope.object_prefix(filename), version))
    }
}

#[async_trait]
impl ArtifactService for GcsArtifactService {
    async fn list_versions(&self, scope: &ArtifactScope, filename: &str) -> Result<Vec<u64>> {
        let prefix = format!("{}/", scope.object_prefix(filename));
        let names = self.client.list(&self.bucket, &prefix).await?;

        // Only direct children whose last segment is a version number count.
        let mut versions: Vec<u64> = names
            .iter()
            .filter_map(|name| name.strip_prefix(&prefix))
            .filter_map(|rest| rest.parse::<u64>().ok())
            .collect();
        versions.sort_unstable();
        versions.dedup();
        Ok(versions)
    }

    async fn load_artifact(
        &self,
        scope: &ArtifactScope,
        filename: &str,
        version: u64,
    ) -> Result<Option<Artifact>> {
        let uri = self.location(scope, filename, version);
        let object = self.client.download(&uri).await?;
        Ok(object.map(|o| Artifact {
            data: o.data,
            mime_type: o.content_type,
        }))
    }

    async fn save_artifact(&self, scope: &ArtifactScope, filename: &str, artifact: Artifact) -> Result<u64> {
        let mime_type = artifact.mime_type.as_deref().unwrap_or("application/octet-stream");
        let mut attempted: Option<u64> = None;

        // Each version object is created only if absent; a concurrent save
        // that claimed the same number makes us move on to the next one.
        for _ in 0..MAX_SAVE_ATTEMPTS {
            let next = self
                .list_versions(scope, filename)
                .await?
                .last()
                .map_or(0, |latest| latest + 1);
            let version = attempted.map_or(next, |prev| next.max(prev + 1));

            let uri = self.location(scope, filename, version);
            if self.client.create(&uri, &artifact.data, mime_type).await? {
                debug!(uri = %uri, version, "Stored artifact version");
                return Ok(version);
            }
            warn!(uri = %uri, version, "Version already taken, retrying");
            attempted = Some(version);
        }

        Err(Error::unexpected(format!(
            "could not claim a new version of '{}' after {} attempts",
            filename, MAX_SAVE_ATTEMPTS
        )))
    }
}

/// Build the artifact backend selected by configuration.
///
/// A configured bucket selects GCS (through `storage_emulator_host` with a
/// fixed token when set, otherwise the public endpoint with ADC); without a
/// bucket artifacts are kept in memory.
///
/// # Errors
/// Returns `Error::Auth` if ADC is required but not configured.
pub async fn connect(config: &Config) -> Result<Arc<dyn ArtifactService>> {
    match &config.artifact_bucket {
        Some(bucket) => {
            let client = match &config.storage_emulator_host {
                Some(host) => {
                    info!(bucket = %bucket, emulator = %host, "Using GCS emulator artifact store");
                    GcsClient::with_base_url(AuthProvider::fixed("emulator"), host.clone())
                }
                None => {
                    info!(bucket = %bucket, "Using GCS artifact store");
                    GcsClient::new(AuthProvider::new().await?)
                }
            };
            Ok(Arc::new(GcsArtifactService::new(client, bucket.clone())))
        }
        None => {
            info!("No ARTIFACT_BUCKET configured, artifacts are kept in memory");
            Ok(Arc::new(InMemoryArtifactService::new()))
        }
    }
}
