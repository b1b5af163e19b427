//! Text-to-speech handler.
//!
//! This module provides the `TtsHandler` struct and the parameter types for
//! converting text, given directly or loaded from an artifact, into audio with
//! the external engine, and for listing the voices the engine offers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use artifact_mcp_common::artifact::{ArtifactRef, ToolContext, resolve, save_artifact_with_metadata};
use artifact_mcp_common::config::Config;
use artifact_mcp_common::error::{Error, Result};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

use crate::assets::{AssetManager, KOKORO_RELEASE_URL, ModelAsset};
use crate::catalog::{self, Gender, VoiceGroup};
use crate::engine::EngineRunner;

/// Default voice for speech synthesis.
pub const DEFAULT_VOICE: &str = "af_sarah";

/// Default output format.
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3";

/// Characters of the input text stored in the audio metadata.
pub const TEXT_PREVIEW_CHARS: usize = 100;

/// Tool name used in metadata and logs.
pub const SOURCE_TOOL: &str = "text_to_speech";

/// Audio container the engine writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    /// Parse a user-supplied format name.
    ///
    /// # Errors
    /// Returns `Error::Validation` for anything but `mp3` or `wav`.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "mp3" => Ok(AudioFormat::Mp3),
            "wav" => Ok(AudioFormat::Wav),
            other => Err(Error::validation(format!(
                "Invalid output_format '{}'. Must be 'mp3' or 'wav'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
        }
    }
}

/// Parameters of the `text_to_speech` tool.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct TextToSpeechParams {
    /// Text to convert to speech (required if text_file is not provided).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Artifact containing the text, with optional version, e.g. "script.txt:2"
    /// (required if text is not provided).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_file: Option<String>,

    /// Voice to use, e.g. "af_sarah", "am_adam", "bf_alice". See list_voices.
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Audio format: "mp3" (default) or "wav".
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Artifact filename for the audio. The format extension is appended when
    /// missing; defaults to tts_<voice>_<timestamp>.<format>.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_output_format() -> String {
    DEFAULT_OUTPUT_FORMAT.to_string()
}

impl Default for TextToSpeechParams {
    fn default() -> Self {
        Self {
            text: None,
            text_file: None,
            voice: default_voice(),
            output_format: default_output_format(),
            output_filename: None,
        }
    }
}

/// Where the text to speak comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource<'a> {
    Direct(&'a str),
    Artifact(&'a str),
}

impl TextToSpeechParams {
    /// Check the input combination and the format without touching anything.
    ///
    /// Empty strings count as absent.
    ///
    /// # Errors
    /// Returns `Error::Validation` unless exactly one text source is given and
    /// the format is supported.
    pub fn validate(&self) -> Result<(TextSource<'_>, AudioFormat)> {
        let text = self.text.as_deref().filter(|t| !t.is_empty());
        let text_file = self.text_file.as_deref().filter(|t| !t.is_empty());

        let source = match (text, text_file) {
            (None, None) => return Err(Error::validation("Either 'text' or 'text_file' must be provided")),
            (Some(_), Some(_)) => return Err(Error::validation("Provide either 'text' or 'text_file', not both")),
            (Some(text), None) => TextSource::Direct(text),
            (None, Some(file)) => TextSource::Artifact(file),
        };

        Ok((source, AudioFormat::parse(&self.output_format)?))
    }
}

/// Parameters of the `list_voices` tool.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct ListVoicesParams {
    /// Language code to filter by: en-us, en-gb, fr, it, ja or zh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Voice gender to filter by: "female" or "male".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechOutcome {
    pub voice: String,
    pub output_format: String,
    pub audio_size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_version: Option<u64>,
}

impl SpeechOutcome {
    /// Whether the audio was stored as an artifact.
    pub fn artifact_saved(&self) -> bool {
        self.output_version.is_some()
    }
}

/// Artifact filename for generated audio.
///
/// ```
/// use artifact_mcp_tts::handler::{AudioFormat, output_filename};
/// use chrono::TimeZone;
///
/// let at = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
/// assert_eq!(output_filename(None, "af_sky", AudioFormat::Wav, at), "tts_af_sky_20240309_070501.wav");
/// assert_eq!(output_filename(Some("intro"), "af_sky", AudioFormat::Mp3, at), "intro.mp3");
/// assert_eq!(output_filename(Some("intro.mp3"), "af_sky", AudioFormat::Mp3, at), "intro.mp3");
/// ```
pub fn output_filename(requested: Option<&str>, voice: &str, format: AudioFormat, now: DateTime<Utc>) -> String {
    let ext = format.as_str();
    match requested.filter(|name| !name.is_empty()) {
        None => format!("tts_{}_{}.{}", voice, now.format("%Y%m%d_%H%M%S"), ext),
        Some(name) if name.ends_with(&format!(".{}", ext)) => name.to_string(),
        Some(name) => format!("{}.{}", name, ext),
    }
}

/// Text-to-speech handler.
#[derive(Debug)]
pub struct TtsHandler {
    assets: AssetManager,
    engine: EngineRunner,
    scratch_root: Option<PathBuf>,
}

impl TtsHandler {
    /// Create a handler for the configured model directory and engine.
    pub fn new(config: &Config) -> Self {
        let assets = AssetManager::new(&config.model_directory, ModelAsset::kokoro(KOKORO_RELEASE_URL));
        let engine = EngineRunner::new(&config.tts_command, &config.model_directory)
            .with_timeout(config.tts_timeout_secs.map(Duration::from_secs));
        Self::with_parts(assets, engine)
    }

    pub fn with_parts(assets: AssetManager, engine: EngineRunner) -> Self {
        Self {
            assets,
            engine,
            scratch_root: None,
        }
    }

    /// Create scratch workspaces under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Convert text to speech.
    ///
    /// With a tool context the audio is saved as a new artifact version (plus
    /// metadata); without one only its size is reported.
    ///
    /// # Errors
    /// - `Error::Validation` for bad input, before any I/O
    /// - `Error::AssetAcquisition` if a model file cannot be downloaded
    /// - `Error::Configuration` if `text_file` is used without a tool context
    /// - `Error::NotFound` / `Error::Decoding` for an unusable text artifact
    /// - `Error::EngineExecution` / `Error::Timeout` if the engine fails
    #[instrument(level = "info", name = "text_to_speech", skip_all, fields(voice = %params.voice))]
    pub async fn synthesize(&self, params: TextToSpeechParams, ctx: Option<&ToolContext>) -> Result<SpeechOutcome> {
        info!("Starting text-to-speech conversion");
        let (source, format) = params.validate()?;
        if !catalog::contains_voice(&params.voice) {
            warn!("Voice is not in the catalog, passing it to the engine as is");
        }

        info!(model_directory = %self.assets.directory().display(), "Using model directory");
        self.assets.ensure_all().await?;

        let text = match source {
            TextSource::Direct(text) => text.to_string(),
            TextSource::Artifact(file) => {
                let ctx = ctx.ok_or_else(|| {
                    Error::configuration("ToolContext is required when using text_file parameter")
                })?;
                load_text(ctx, file).await?
            }
        };
        info!(chars = text.chars().count(), from_artifact = matches!(source, TextSource::Artifact(_)), "Text loaded");

        let audio = self.run_engine(&text, &params.voice, format).await?;
        info!(bytes = audio.len(), "Generated audio");

        let mut outcome = SpeechOutcome {
            voice: params.voice.clone(),
            output_format: format.as_str().to_string(),
            audio_size_bytes: audio.len(),
            output_filename: None,
            output_version: None,
        };

        if let Some(ctx) = ctx {
            let now = Utc::now();
            let filename = output_filename(params.output_filename.as_deref(), &params.voice, format, now);
            let metadata = audio_metadata(&params.voice, format, &text, now);
            let saved = save_artifact_with_metadata(
                ctx.artifacts.as_ref(),
                &ctx.scope,
                &filename,
                audio,
                format.mime_type(),
                metadata,
                now,
            )
            .await?;
            info!(filename = %saved.filename, version = saved.data_version, "Saved audio artifact");

            outcome.output_filename = Some(saved.filename);
            outcome.output_version = Some(saved.data_version);
        }

        Ok(outcome)
    }

    /// Write the text into a fresh scratch workspace, run the engine there and
    /// read back the audio. The workspace is removed on every exit path.
    async fn run_engine(&self, text: &str, voice: &str, format: AudioFormat) -> Result<Vec<u8>> {
        let scratch = create_scratch(self.scratch_root.clone()).await?;
        debug!(scratch = %scratch.path().display(), "Created scratch workspace");

        let result = self.run_engine_in(scratch.path(), text, voice, format).await;
        remove_scratch(scratch).await;
        result
    }

    async fn run_engine_in(&self, scratch: &Path, text: &str, voice: &str, format: AudioFormat) -> Result<Vec<u8>> {
        let input = scratch.join("input.txt");
        let output = scratch.join(format!("output.{}", format.as_str()));

        tokio::fs::write(&input, text).await?;
        self.engine.synthesize(&input, &output, voice, format).await?;
        Ok(tokio::fs::read(&output).await?)
    }

    /// Catalog voices matching the filters.
    ///
    /// # Errors
    /// Returns `Error::Validation` for an unknown language.
    pub fn list_voices(&self, params: &ListVoicesParams) -> Result<Vec<VoiceGroup>> {
        catalog::filter(params.language.as_deref(), params.gender)
    }
}

/// Create a `tts-*` scratch directory under `root` (or the system temp dir)
/// on the blocking pool.
async fn create_scratch(root: Option<PathBuf>) -> Result<TempDir> {
    tokio::task::spawn_blocking(move || {
        let mut builder = tempfile::Builder::new();
        builder.prefix("tts-");
        match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    })
    .await
    .map_err(|e| Error::unexpected(format!("scratch setup task failed: {}", e)))?
    .map_err(Error::from)
}

/// Delete a scratch directory on the blocking pool. Failures are only logged.
async fn remove_scratch(scratch: TempDir) {
    let path = scratch.path().to_path_buf();
    match tokio::task::spawn_blocking(move || scratch.close()).await {
        Ok(Ok(())) => debug!(scratch = %path.display(), "Removed scratch workspace"),
        Ok(Err(e)) => warn!(scratch = %path.display(), error = %e, "Failed to remove scratch workspace"),
        Err(e) => warn!(scratch = %path.display(), error = %e, "Scratch cleanup task failed"),
    }
}

async fn load_text(ctx: &ToolContext, text_file: &str) -> Result<String> {
    let reference = ArtifactRef::parse(text_file)?;
    let artifact = resolve(ctx.artifacts.as_ref(), &ctx.scope, &reference).await?;
    let text = String::from_utf8(artifact.data).map_err(|e| {
        Error::decoding(format!(
            "text artifact '{}' v{} is not valid UTF-8: {}",
            artifact.name, artifact.version, e
        ))
    })?;
    debug!(artifact = %reference, chars = text.chars().count(), "Loaded text artifact");
    Ok(text)
}

fn audio_metadata(voice: &str, format: AudioFormat, text: &str, now: DateTime<Utc>) -> Map<String, Value> {
    let preview: String = text.chars().take(TEXT_PREVIEW_CHARS).collect();
    let mut metadata = Map::new();
    metadata.insert(
        "description".into(),
        Value::from(format!("Text-to-speech audio generated with voice '{}'", voice)),
    );
    metadata.insert("source_tool".into(), Value::from(SOURCE_TOOL));
    metadata.insert("voice".into(), Value::from(voice));
    metadata.insert("format".into(), Value::from(format.as_str()));
    metadata.insert("text_preview".into(), Value::from(preview));
    metadata.insert("creation_timestamp_iso".into(), Value::from(now.to_rfc3339()));
    metadata
}
