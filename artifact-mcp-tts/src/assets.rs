//! On-demand model file acquisition.
//!
//! The engine needs its model files in its working directory. Missing files
//! are downloaded once: a per-file async lock is held across the existence
//! check and the download, and data is streamed into `<file>.part` which is
//! renamed into place only when complete.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use artifact_mcp_common::error::{Error, Result};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

/// Release the default Kokoro model files are fetched from.
pub const KOKORO_RELEASE_URL: &str = "https://github.com/nazdridoy/kokoro-tts/releases/download/v1.0.0";

/// Default Kokoro model file names.
pub const KOKORO_MODEL_FILES: &[&str] = &["kokoro-v1.0.onnx", "voices-v1.0.bin"];

/// A file the engine needs and where to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAsset {
    pub file_name: String,
    pub url: String,
}

impl ModelAsset {
    pub fn new(file_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            url: url.into(),
        }
    }

    /// The Kokoro model files, fetched from `release_url`.
    pub fn kokoro(release_url: &str) -> Vec<Self> {
        let base = release_url.trim_end_matches('/');
        KOKORO_MODEL_FILES
            .iter()
            .map(|name| Self::new(*name, format!("{}/{}", base, name)))
            .collect()
    }
}

/// Keeps a directory stocked with model assets.
#[derive(Debug)]
pub struct AssetManager {
    client: reqwest::Client,
    directory: PathBuf,
    assets: Vec<ModelAsset>,
    in_flight: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl AssetManager {
    pub fn new(directory: impl Into<PathBuf>, assets: Vec<ModelAsset>) -> Self {
        Self {
            client: reqwest::Client::new(),
            directory: directory.into(),
            assets,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn assets(&self) -> &[ModelAsset] {
        &self.assets
    }

    /// Make sure every asset exists in the directory, downloading what is
    /// missing.
    ///
    /// # Errors
    /// Returns `Error::AssetAcquisition` naming the first file that could not
    /// be fetched, or `Error::Io` if the directory cannot be created.
    #[instrument(level = "debug", skip(self), fields(directory = %self.directory.display()))]
    pub async fn ensure_all(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;
        for asset in &self.assets {
            self.ensure(asset).await?;
        }
        Ok(())
    }

    async fn ensure(&self, asset: &ModelAsset) -> Result<()> {
        let path = self.directory.join(&asset.file_name);
        let lock = self.lock_for(&path).await;
        let _guard = lock.lock().await;

        if tokio::fs::try_exists(&path).await? {
            debug!(file = %asset.file_name, "Model file exists");
            return Ok(());
        }

        info!(file = %asset.file_name, url = %asset.url, "Downloading model file");
        match self.download(asset, &path).await {
            Ok(bytes) => {
                info!(file = %asset.file_name, bytes, "Successfully downloaded model file");
                Ok(())
            }
            Err(e) => {
                error!(file = %asset.file_name, error = %format!("{:#}", e), "Model download failed");
                Err(Error::asset_acquisition(&asset.file_name, format!("{:#}", e)))
            }
        }
    }

    async fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        Arc::clone(in_flight.entry(path.to_path_buf()).or_default())
    }

    async fn download(&self, asset: &ModelAsset, destination: &Path) -> anyhow::Result<u64> {
        let partial = destination.with_file_name(format!("{}.part", asset.file_name));
        let result = self.stream_to(&asset.url, &partial).await;

        match result {
            Ok(bytes) => {
                tokio::fs::rename(&partial, destination)
                    .await
                    .with_context(|| format!("moving {} into place", partial.display()))?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }

    async fn stream_to(&self, url: &str, path: &Path) -> anyhow::Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()?;

        let mut file = tokio::fs::File::create(path)
            .await
            .with_context(|| format!("creating {}", path.display()))?;

        let mut written = 0u64;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.context("reading response body")?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.sync_all().await?;

        Ok(written)
    }
}
