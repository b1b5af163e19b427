//! Artifact MCP TTS Server
//!
//! MCP server for text-to-speech using the kokoro-tts command-line engine.
//!
//! # Tools
//!
//! - `text_to_speech` - Convert text or a text artifact to mp3/wav audio
//! - `list_voices` - List voices by language and gender
//!
//! # Usage
//!
//! ```bash
//! # Run with stdio transport (default)
//! artifact-mcp-tts
//!
//! # Run with HTTP transport and a custom model directory
//! artifact-mcp-tts --transport http --port 8080 --model-directory /opt/kokoro
//! ```

use std::path::PathBuf;

use anyhow::Result;
use artifact_mcp_common::artifact::ToolContext;
use artifact_mcp_common::{Config, McpServerBuilder, TransportArgs, store, tracing::init_tracing};
use artifact_mcp_tts::{TtsHandler, TtsServer};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "artifact-mcp-tts")]
#[command(about = "MCP server for text-to-speech using kokoro-tts")]
#[command(version)]
struct Args {
    #[command(flatten)]
    transport: TransportArgs,

    /// Directory holding the model files (overrides MODEL_DIRECTORY)
    #[arg(long)]
    model_directory: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = args.model_directory {
        config.model_directory = dir;
    }

    tracing::info!(
        app_name = %config.app_name,
        model_directory = %config.model_directory.display(),
        command = %config.tts_command,
        "Starting artifact-mcp-tts server"
    );

    let artifacts = store::connect(&config).await?;
    let context = ToolContext::new(config.scope(), artifacts);
    let server = TtsServer::new(TtsHandler::new(&config), Some(context));

    McpServerBuilder::new(server)
        .with_transport(args.transport.into_transport())
        .run()
        .await?;

    Ok(())
}
