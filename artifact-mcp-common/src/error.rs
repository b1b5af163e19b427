//! Error types for the artifact tools.
//!
//! One `thiserror` hierarchy is shared by every tool server so that the
//! operation boundary can turn any failure into the same result envelope.
//!
//! # Error Categories
//!
//! - `Error::Validation`: bad or missing input combinations
//! - `Error::Configuration`: a required collaborator is unavailable
//! - `Error::NotFound`: artifact or version absent
//! - `Error::AssetAcquisition`: a model file could not be downloaded
//! - `Error::EngineExecution`: the synthesis engine failed or produced nothing
//! - `Error::Decoding`: artifact content is not valid UTF-8 text
//! - `Error::Timeout`: an optional process deadline elapsed
//! - `ConfigError`, `GcsError`, `AuthError`, `Error::Io`, `Error::Unexpected`:
//!   everything else, reported as unexpected at the boundary

use thiserror::Error;

/// Unified error type for the artifact tools.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading errors (invalid env values)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// GCS operation errors
    #[error(transparent)]
    Gcs(#[from] GcsError),

    /// Authentication errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A collaborator the operation depends on is not available
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Artifact or artifact version does not exist
    #[error("{0}")]
    NotFound(String),

    /// A model asset could not be fetched
    #[error("Failed to download model file {asset}: {message}")]
    AssetAcquisition {
        /// File name of the missing asset
        asset: String,
        /// Underlying failure
        message: String,
    },

    /// External engine exited non-zero or produced no output
    #[error("TTS conversion failed: {0}")]
    EngineExecution(String),

    /// Content could not be decoded as text
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Operation timeout errors
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    /// File system I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything else
    #[error("{0}")]
    Unexpected(String),
}

impl Error {
    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```
    /// use artifact_mcp_common::error::Error;
    ///
    /// let err = Error::validation("text cannot be empty");
    /// assert!(err.to_string().contains("text cannot be empty"));
    /// ```
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Create a new not-found error.
    ///
    /// # Example
    ///
    /// ```
    /// use artifact_mcp_common::error::Error;
    ///
    /// let err = Error::not_found("Artifact 'photo.jpg' not found.");
    /// assert!(err.is_not_found());
    /// ```
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    /// Create a new asset acquisition error naming the asset.
    ///
    /// # Example
    ///
    /// ```
    /// use artifact_mcp_common::error::Error;
    ///
    /// let err = Error::asset_acquisition("voices-v1.0.bin", "HTTP 404");
    /// assert!(err.to_string().contains("voices-v1.0.bin"));
    /// ```
    pub fn asset_acquisition(asset: impl Into<String>, message: impl Into<String>) -> Self {
        Error::AssetAcquisition {
            asset: asset.into(),
            message: message.into(),
        }
    }

    /// Create a new engine execution error.
    pub fn engine(message: impl Into<String>) -> Self {
        Error::EngineExecution(message.into())
    }

    /// Create a new decoding error.
    pub fn decoding(message: impl Into<String>) -> Self {
        Error::Decoding(message.into())
    }

    /// Create a new timeout error.
    pub fn timeout(seconds: u64) -> Self {
        Error::Timeout(seconds)
    }

    /// Create a new unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Error::Unexpected(message.into())
    }

    /// Whether this is a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Errors caused by the caller's input rather than by the system.
    ///
    /// These are logged at warning level; everything else is logged as an error.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::Validation(_))
    }

    /// Human-readable summary that is safe to return to a tool caller.
    pub fn user_message(&self) -> String {
        match self {
            Error::Config(_)
            | Error::Gcs(_)
            | Error::Auth(_)
            | Error::Io(_)
            | Error::Unexpected(_) => format!("An unexpected error occurred: {}", self),
            _ => self.to_string(),
        }
    }
}

/// Configuration errors.
///
/// These errors occur when loading or validating configuration from
/// environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    /// Create a new invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// GCS operation type for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcsOperation {
    /// Upload operation
    Upload,
    /// Download operation
    Download,
    /// Prefix listing
    List,
}

impl std::fmt::Display for GcsOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GcsOperation::Upload => write!(f, "upload"),
            GcsOperation::Download => write!(f, "download"),
            GcsOperation::List => write!(f, "list"),
        }
    }
}

/// GCS operation errors.
#[derive(Debug, Error)]
pub enum GcsError {
    /// A GCS operation failed with context about the object and operation type
    #[error("GCS {operation} failed for {uri}: {message}")]
    OperationFailed {
        /// The `gs://` location that was being accessed
        uri: String,
        /// The type of operation that failed
        operation: GcsOperation,
        /// Error message describing the failure
        message: String,
    },

    /// Authentication error during GCS operation
    #[error("GCS authentication error: {0}")]
    AuthError(String),
}

impl GcsError {
    /// Create a new operation failed error with full context.
    ///
    /// # Example
    ///
    /// ```
    /// use artifact_mcp_common::error::{GcsError, GcsOperation};
    ///
    /// let err = GcsError::operation_failed(
    ///     "gs://artifacts/app/user/session/photo.jpg/0",
    ///     GcsOperation::Download,
    ///     "Permission denied"
    /// );
    /// assert!(err.to_string().contains("download"));
    /// ```
    pub fn operation_failed(
        uri: impl Into<String>,
        operation: GcsOperation,
        message: impl Into<String>,
    ) -> Self {
        GcsError::OperationFailed {
            uri: uri.into(),
            operation,
            message: message.into(),
        }
    }
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// ADC is not configured
    #[error("ADC not configured. Run 'gcloud auth application-default login' or set GOOGLE_APPLICATION_CREDENTIALS")]
    NotConfigured,

    /// Token refresh failed
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;
