//! Configuration module for loading environment variables and settings.

use std::path::PathBuf;
use std::str::FromStr;

use crate::artifact::ArtifactScope;
use crate::error::ConfigError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Application name artifacts are namespaced under
    pub app_name: String,
    /// User the server acts for
    pub user_id: String,
    /// Session artifacts are saved into
    pub session_id: String,
    /// GCS bucket for artifacts; in-memory storage when unset
    pub artifact_bucket: Option<String>,
    /// Alternative GCS endpoint (e.g. a local emulator)
    pub storage_emulator_host: Option<String>,
    /// Directory served by the hosting web server
    pub host_directory: PathBuf,
    /// Address the hosting web server binds to
    pub host_bind: String,
    /// Port the hosting web server listens on
    pub host_port: u16,
    /// Public base URL of hosted files, if it differs from the bind address
    pub base_url: Option<String>,
    /// Directory holding the TTS model files
    pub model_directory: PathBuf,
    /// TTS engine executable
    pub tts_command: String,
    /// Optional deadline for one engine run (`TTS_TIMEOUT_SECS=0` disables it)
    pub tts_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "artifact-mcp".to_string(),
            user_id: "default-user".to_string(),
            session_id: "default-session".to_string(),
            artifact_bucket: None,
            storage_emulator_host: None,
            host_directory: PathBuf::from("./hosted"),
            host_bind: "127.0.0.1".to_string(),
            host_port: 8081,
            base_url: None,
            model_directory: PathBuf::from("./models"),
            tts_command: "kokoro-tts".to_string(),
            tts_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            user_id: get("USER_ID").unwrap_or(defaults.user_id),
            session_id: get("SESSION_ID").unwrap_or(defaults.session_id),
            artifact_bucket: get("ARTIFACT_BUCKET"),
            storage_emulator_host: get("STORAGE_EMULATOR_HOST"),
            host_directory: get("HOST_DIRECTORY").map(PathBuf::from).unwrap_or(defaults.host_directory),
            host_bind: get("HOST_BIND").unwrap_or(defaults.host_bind),
            host_port: parse_var("HOST_PORT", get("HOST_PORT"))?.unwrap_or(defaults.host_port),
            base_url: get("BASE_URL"),
            model_directory: get("MODEL_DIRECTORY").map(PathBuf::from).unwrap_or(defaults.model_directory),
            tts_command: get("TTS_COMMAND").unwrap_or(defaults.tts_command),
            tts_timeout_secs: parse_var("TTS_TIMEOUT_SECS", get("TTS_TIMEOUT_SECS"))?.filter(|secs: &u64| *secs > 0),
        })
    }

    /// The artifact namespace this server operates in.
    pub fn scope(&self) -> ArtifactScope {
        ArtifactScope::new(&self.app_name, &self.user_id, &self.session_id)
    }
}

fn parse_var<T>(name: &str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| ConfigError::invalid_value(name, format!("'{}': {}", v, e)))
        })
        .transpose()
}
