//! Versioned artifact references, the artifact service seam, and resolution.
//!
//! Every tool that reads an artifact goes through [`resolve`]: parse the
//! reference, pick the highest version when none was given, load it, and report
//! a missing name or version as [`Error::NotFound`].
//!
//! Backends implement either [`ArtifactService`] (async) or
//! [`BlockingArtifactService`] (plain blocking calls). The latter is adapted by
//! [`Blocking`], which runs each call on tokio's blocking pool, so callers only
//! ever deal with the async trait.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Prefix marking an artifact as shared by all sessions of a user.
pub const USER_NAMESPACE_PREFIX: &str = "user:";

/// Suffix of the companion artifact that holds an artifact's metadata.
pub const METADATA_SUFFIX: &str = ".metadata.json";

/// A possibly-versioned artifact name, e.g. `photo.jpg` or `photo.jpg:2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactRef {
    /// Artifact filename, never empty
    pub name: String,
    /// Explicit version; `None` means "latest"
    pub version: Option<u64>,
}

impl ArtifactRef {
    /// Parse `name[:version]`.
    ///
    /// Only the text after the last `:` is considered, and only when it is a
    /// run of ASCII digits that fits in a `u64` and the text before it is not
    /// empty. Anything else makes the whole input the name, so names such as
    /// `user:notes.txt` or `a:b:c` stay intact.
    ///
    /// ```
    /// use artifact_mcp_common::artifact::ArtifactRef;
    ///
    /// let r = ArtifactRef::parse("photo.jpg:3").unwrap();
    /// assert_eq!((r.name.as_str(), r.version), ("photo.jpg", Some(3)));
    ///
    /// let r = ArtifactRef::parse("a:b:c").unwrap();
    /// assert_eq!((r.name.as_str(), r.version), ("a:b:c", None));
    /// ```
    ///
    /// # Errors
    /// Returns `Error::Validation` for an empty reference.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::validation("artifact filename cannot be empty"));
        }

        if let Some((name, suffix)) = raw.rsplit_once(':') {
            let numeric = !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit());
            if numeric && !name.is_empty() {
                if let Ok(version) = suffix.parse::<u64>() {
                    return Ok(Self::versioned(name, version));
                }
            }
        }

        Ok(Self::latest(raw))
    }

    /// Reference to the latest version of `name`.
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Reference to a fixed version of `name`.
    pub fn versioned(name: impl Into<String>, version: u64) -> Self {
        Self {
            name: name.into(),
            version: Some(version),
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(v) => write!(f, "{}:{}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The (application, user, session) triple artifacts are namespaced under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactScope {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl ArtifactScope {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }

    /// Storage path prefix for `filename` under this scope.
    ///
    /// `user:` names live under the user rather than the session.
    pub fn object_prefix(&self, filename: &str) -> String {
        if filename.starts_with(USER_NAMESPACE_PREFIX) {
            format!("{}/{}/user/{}", self.app_name, self.user_id, filename)
        } else {
            format!("{}/{}/{}/{}", self.app_name, self.user_id, self.session_id, filename)
        }
    }
}

/// One stored artifact version as the service returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub data: Vec<u8>,
    pub mime_type: Option<String>,
}

impl Artifact {
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: Some(mime_type.into()),
        }
    }
}

/// A concrete artifact version fetched for a single request.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    pub name: String,
    pub version: u64,
    pub data: Vec<u8>,
    pub mime_type: Option<String>,
}

/// Async artifact storage.
#[async_trait]
pub trait ArtifactService: Send + Sync {
    /// All stored versions of `filename`, in no particular order.
    async fn list_versions(&self, scope: &ArtifactScope, filename: &str) -> Result<Vec<u64>>;

    /// Content of one version, `None` if it does not exist.
    async fn load_artifact(
        &self,
        scope: &ArtifactScope,
        filename: &str,
        version: u64,
    ) -> Result<Option<Artifact>>;

    /// Store a new version and return the version number assigned to it.
    async fn save_artifact(&self, scope: &ArtifactScope, filename: &str, artifact: Artifact) -> Result<u64>;
}

/// Artifact storage with plain blocking calls.
///
/// Wrap implementations in [`Blocking`] to use them where an
/// [`ArtifactService`] is expected.
pub trait BlockingArtifactService: Send + Sync + 'static {
    fn list_versions(&self, scope: &ArtifactScope, filename: &str) -> Result<Vec<u64>>;

    fn load_artifact(&self, scope: &ArtifactScope, filename: &str, version: u64) -> Result<Option<Artifact>>;

    fn save_artifact(&self, scope: &ArtifactScope, filename: &str, artifact: Artifact) -> Result<u64>;
}

/// Adapter running a [`BlockingArtifactService`] on the blocking thread pool.
pub struct Blocking<S>(Arc<S>);

impl<S: BlockingArtifactService> Blocking<S> {
    pub fn new(inner: S) -> Self {
        Self(Arc::new(inner))
    }

    async fn run<T, F>(&self, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.0);
        tokio::task::spawn_blocking(move || call(inner.as_ref()))
            .await
            .map_err(|e| Error::unexpected(format!("artifact service task failed: {}", e)))?
    }
}

#[async_trait]
impl<S: BlockingArtifactService> ArtifactService for Blocking<S> {
    async fn list_versions(&self, scope: &ArtifactScope, filename: &str) -> Result<Vec<u64>> {
        let scope = scope.clone();
        let filename = filename.to_string();
        self.run(move |svc| svc.list_versions(&scope, &filename)).await
    }

    async fn load_artifact(
        &self,
        scope: &ArtifactScope,
        filename: &str,
        version: u64,
    ) -> Result<Option<Artifact>> {
        let scope = scope.clone();
        let filename = filename.to_string();
        self.run(move |svc| svc.load_artifact(&scope, &filename, version)).await
    }

    async fn save_artifact(&self, scope: &ArtifactScope, filename: &str, artifact: Artifact) -> Result<u64> {
        let scope = scope.clone();
        let filename = filename.to_string();
        self.run(move |svc| svc.save_artifact(&scope, &filename, artifact)).await
    }
}

/// What a tool needs from its caller to touch artifacts.
#[derive(Clone)]
pub struct ToolContext {
    pub scope: ArtifactScope,
    pub artifacts: Arc<dyn ArtifactService>,
}

impl ToolContext {
    pub fn new(scope: ArtifactScope, artifacts: Arc<dyn ArtifactService>) -> Self {
        Self { scope, artifacts }
    }
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext").field("scope", &self.scope).finish_non_exhaustive()
    }
}

/// Fetch the artifact `reference` points at.
///
/// # Errors
/// - `Error::NotFound` if the name has no versions or the version has no content
/// - whatever the service returns for any other failure
#[instrument(level = "debug", skip(service, scope), fields(artifact = %reference))]
pub async fn resolve(
    service: &dyn ArtifactService,
    scope: &ArtifactScope,
    reference: &ArtifactRef,
) -> Result<ResolvedArtifact> {
    let version = match reference.version {
        Some(v) => v,
        None => {
            let versions = service.list_versions(scope, &reference.name).await?;
            versions
                .into_iter()
                .max()
                .ok_or_else(|| Error::not_found(format!("Artifact '{}' not found.", reference.name)))?
        }
    };

    debug!(version, "Loading artifact version");

    let artifact = service
        .load_artifact(scope, &reference.name, version)
        .await?
        .ok_or_else(|| {
            Error::not_found(format!("Content for '{}' v{} not found.", reference.name, version))
        })?;

    debug!(bytes = artifact.data.len(), "Loaded artifact");

    Ok(ResolvedArtifact {
        name: reference.name.clone(),
        version,
        data: artifact.data,
        mime_type: artifact.mime_type,
    })
}

/// Versions assigned by [`save_artifact_with_metadata`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub filename: String,
    pub data_version: u64,
    pub metadata_version: u64,
}

/// Save `data` as a new version of `filename`, then record its metadata in the
/// companion artifact `<filename>.metadata.json`.
///
/// The stored metadata is the caller's map plus `filename`, `mime_type`,
/// `size_bytes`, `data_version` and `creation_timestamp_iso` (unless supplied).
pub async fn save_artifact_with_metadata(
    service: &dyn ArtifactService,
    scope: &ArtifactScope,
    filename: &str,
    data: Vec<u8>,
    mime_type: &str,
    mut metadata: Map<String, Value>,
    timestamp: DateTime<Utc>,
) -> Result<SavedArtifact> {
    let size_bytes = data.len();
    let data_version = service
        .save_artifact(scope, filename, Artifact::new(data, mime_type))
        .await?;

    metadata.insert("filename".into(), Value::from(filename));
    metadata.insert("mime_type".into(), Value::from(mime_type));
    metadata.insert("size_bytes".into(), Value::from(size_bytes));
    metadata.insert("data_version".into(), Value::from(data_version));
    metadata
        .entry("creation_timestamp_iso")
        .or_insert_with(|| Value::from(timestamp.to_rfc3339()));

    let body = serde_json::to_vec_pretty(&metadata)
        .map_err(|e| Error::unexpected(format!("failed to encode artifact metadata: {}", e)))?;
    let metadata_name = format!("{}{}", filename, METADATA_SUFFIX);
    let metadata_version = service
        .save_artifact(scope, &metadata_name, Artifact::new(body, "application/json"))
        .await?;

    debug!(filename, data_version, metadata_version, "Saved artifact with metadata");

    Ok(SavedArtifact {
        filename: filename.to_string(),
        data_version,
        metadata_version,
    })
}
