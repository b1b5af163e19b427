//! Access tokens for the GCS artifact backend.
//!
//! Production credentials come from Application Default Credentials through
//! `gcp_auth`. A fixed token source exists for storage emulators and tests,
//! where no real credential is involved.

use std::sync::Arc;

use gcp_auth::TokenProvider;
use tracing::{debug, instrument};

use crate::error::AuthError;

/// Read/write access to Google Cloud Storage.
pub const DEVSTORAGE_READ_WRITE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

/// Read-only access to Google Cloud Storage.
pub const DEVSTORAGE_READ_ONLY: &str = "https://www.googleapis.com/auth/devstorage.read_only";

enum TokenSource {
    Adc(Arc<dyn TokenProvider>),
    Fixed(String),
}

/// Source of bearer tokens for storage requests.
pub struct AuthProvider {
    source: TokenSource,
}

impl AuthProvider {
    /// Discover Application Default Credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotConfigured` if no credentials can be found.
    #[instrument(level = "debug", name = "auth_provider_new")]
    pub async fn new() -> Result<Self, AuthError> {
        let provider = gcp_auth::provider().await.map_err(|e| {
            debug!(error = %e, "ADC discovery failed");
            AuthError::NotConfigured
        })?;

        Ok(Self {
            source: TokenSource::Adc(provider),
        })
    }

    /// Always hand out the same token. Used against storage emulators.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Fixed(token.into()),
        }
    }

    /// Get a bearer token for the given scopes.
    ///
    /// `gcp_auth` caches and refreshes tokens itself; callers should ask for a
    /// token per request instead of holding on to one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RefreshFailed` if the token cannot be obtained.
    pub async fn get_token(&self, scopes: &[&str]) -> Result<String, AuthError> {
        match &self.source {
            TokenSource::Adc(provider) => {
                let token = provider
                    .token(scopes)
                    .await
                    .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;
                Ok(token.as_str().to_string())
            }
            TokenSource::Fixed(token) => Ok(token.clone()),
        }
    }
}

impl std::fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.source {
            TokenSource::Adc(_) => "adc",
            TokenSource::Fixed(_) => "fixed",
        };
        f.debug_struct("AuthProvider").field("source", &kind).finish()
    }
}
