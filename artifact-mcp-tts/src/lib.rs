//! Artifact MCP TTS Server Library
//!
//! Text-to-speech with the Kokoro command-line engine. Input text comes from
//! the request or from an artifact; the audio is saved back as an artifact.

pub mod assets;
pub mod catalog;
pub mod engine;
pub mod handler;
pub mod server;

pub use assets::{AssetManager, ModelAsset};
pub use engine::EngineRunner;
pub use handler::{AudioFormat, ListVoicesParams, SpeechOutcome, TextToSpeechParams, TtsHandler};
pub use server::TtsServer;
