//! Minimal Google Cloud Storage JSON API client.
//!
//! Only the calls the GCS artifact backend needs: upload an object (optionally
//! only if it does not exist yet), download an object, and list object names
//! under a prefix.

use serde::Deserialize;
use tracing::debug;

use crate::auth::{AuthProvider, DEVSTORAGE_READ_ONLY, DEVSTORAGE_READ_WRITE};
use crate::error::{GcsError, GcsOperation};

/// Default GCS endpoint.
pub const GCS_BASE_URL: &str = "https://storage.googleapis.com";

/// Location of one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcsUri {
    /// Bucket name
    pub bucket: String,
    /// Object path within the bucket
    pub object: String,
}

impl GcsUri {
    /// Build a location from bucket and object path.
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
        }
    }
}

impl std::fmt::Display for GcsUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.object)
    }
}

/// Downloaded object body with its stored content type.
#[derive(Debug, Clone)]
pub struct GcsObject {
    /// Object bytes
    pub data: Vec<u8>,
    /// `Content-Type` reported by GCS, if any
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<ListItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    name: String,
}

/// GCS operations client.
#[derive(Debug)]
pub struct GcsClient {
    client: reqwest::Client,
    auth: AuthProvider,
    base_url: String,
}

impl GcsClient {
    /// Create a client against the public GCS endpoint.
    pub fn new(auth: AuthProvider) -> Self {
        Self::with_base_url(auth, GCS_BASE_URL)
    }

    /// Create a client against a custom endpoint (emulators, tests).
    pub fn with_base_url(auth: AuthProvider, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn token(&self, scope: &str) -> Result<String, GcsError> {
        self.auth
            .get_token(&[scope])
            .await
            .map_err(|e| GcsError::AuthError(e.to_string()))
    }

    /// Upload bytes to an object, replacing any existing content.
    ///
    /// # Errors
    /// Returns `GcsError::OperationFailed` if the upload fails.
    pub async fn upload(&self, uri: &GcsUri, data: &[u8], content_type: &str) -> Result<(), GcsError> {
        self.send_upload(uri, data, content_type, false).await.map(|_| ())
    }

    /// Upload bytes to an object that must not exist yet.
    ///
    /// Returns `Ok(false)` when the object already exists (HTTP 412), leaving
    /// it untouched.
    ///
    /// # Errors
    /// Returns `GcsError::OperationFailed` for any other failure.
    pub async fn create(&self, uri: &GcsUri, data: &[u8], content_type: &str) -> Result<bool, GcsError> {
        self.send_upload(uri, data, content_type, true).await
    }

    async fn send_upload(
        &self,
        uri: &GcsUri,
        data: &[u8],
        content_type: &str,
        only_if_absent: bool,
    ) -> Result<bool, GcsError> {
        let token = self.token(DEVSTORAGE_READ_WRITE).await?;
        let mut url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.base_url,
            uri.bucket,
            urlencoding::encode(&uri.object)
        );
        if only_if_absent {
            url.push_str("&ifGenerationMatch=0");
        }

        debug!(uri = %uri, bytes = data.len(), only_if_absent, "Uploading object");
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Content-Type", content_type)
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| {
                GcsError::operation_failed(uri.to_string(), GcsOperation::Upload, format!("Upload request failed: {}", e))
            })?;

        let status = response.status();
        if only_if_absent && status == reqwest::StatusCode::PRECONDITION_FAILED {
            debug!(uri = %uri, "Object already exists");
            return Ok(false);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GcsError::operation_failed(
                uri.to_string(),
                GcsOperation::Upload,
                format!("Failed with status {}: {}", status, body),
            ));
        }

        Ok(true)
    }

    /// Download an object. A missing object yields `Ok(None)`.
    ///
    /// # Errors
    /// Returns `GcsError::OperationFailed` for any failure other than 404.
    pub async fn download(&self, uri: &GcsUri) -> Result<Option<GcsObject>, GcsError> {
        let token = self.token(DEVSTORAGE_READ_ONLY).await?;
        let url = format!(
            "{}/storage/v1/b/{}/o/{}?alt=media",
            self.base_url,
            uri.bucket,
            urlencoding::encode(&uri.object)
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                GcsError::operation_failed(uri.to_string(), GcsOperation::Download, format!("Download request failed: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GcsError::operation_failed(
                uri.to_string(),
                GcsOperation::Download,
                format!("Failed with status {}: {}", status, body),
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let data = response.bytes().await.map_err(|e| {
            GcsError::operation_failed(
                uri.to_string(),
                GcsOperation::Download,
                format!("Failed to read response body: {}", e),
            )
        })?;

        Ok(Some(GcsObject {
            data: data.to_vec(),
            content_type,
        }))
    }

    /// List the names of all objects under `prefix`, following pagination.
    ///
    /// # Errors
    /// Returns `GcsError::OperationFailed` if any page request fails.
    pub async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, GcsError> {
        let location = format!("gs://{}/{}", bucket, prefix);
        let url = format!("{}/storage/v1/b/{}/o", self.base_url, bucket);
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.token(DEVSTORAGE_READ_ONLY).await?;
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(token)
                .query(&[("prefix", prefix), ("fields", "items(name),nextPageToken")]);
            if let Some(ref page) = page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let response = request.send().await.map_err(|e| {
                GcsError::operation_failed(&location, GcsOperation::List, format!("List request failed: {}", e))
            })?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(GcsError::operation_failed(
                    &location,
                    GcsOperation::List,
                    format!("Failed with status {}: {}", status, body),
                ));
            }

            let page: ListResponse = response.json().await.map_err(|e| {
                GcsError::operation_failed(&location, GcsOperation::List, format!("Invalid list response: {}", e))
            })?;

            names.extend(page.items.into_iter().map(|item| item.name));
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(names)
    }
}
