//! MCP Server implementation for the TTS server.
//!
//! This module provides the MCP server handler that exposes:
//! - `text_to_speech` tool for converting text or a text artifact to audio
//! - `list_voices` tool for browsing the voice catalog

use std::borrow::Cow;
use std::sync::Arc;

use artifact_mcp_common::artifact::ToolContext;
use artifact_mcp_common::envelope::Envelope;
use artifact_mcp_common::error::Error;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::{CallToolResult, ListResourcesResult, ReadResourceResult, ServerCapabilities, ServerInfo},
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::handler::{ListVoicesParams, TextToSpeechParams, TtsHandler};

pub const TEXT_TO_SPEECH_TOOL: &str = "text_to_speech";
pub const LIST_VOICES_TOOL: &str = "list_voices";

/// MCP Server for text-to-speech.
#[derive(Clone)]
pub struct TtsServer {
    handler: Arc<TtsHandler>,
    context: Option<ToolContext>,
}

impl TtsServer {
    /// Without a `context`, audio is generated but not saved and `text_file`
    /// cannot be used.
    pub fn new(handler: TtsHandler, context: Option<ToolContext>) -> Self {
        Self {
            handler: Arc::new(handler),
            context,
        }
    }

    /// Convert text to speech and wrap the outcome in an envelope.
    pub async fn text_to_speech(&self, params: TextToSpeechParams) -> Envelope {
        let voice = params.voice.clone();
        match self.handler.synthesize(params, self.context.as_ref()).await {
            Ok(outcome) => {
                let message = if outcome.artifact_saved() {
                    format!("Text-to-speech conversion successful using voice '{}'", outcome.voice)
                } else {
                    "Text-to-speech conversion successful (no artifact saved - missing tool_context)".to_string()
                };
                Envelope::success(message, &outcome)
            }
            Err(e) => Envelope::from_error(&e, TEXT_TO_SPEECH_TOOL).with_field("voice", voice),
        }
    }

    /// List catalog voices and wrap them in an envelope.
    pub fn list_voices(&self, params: ListVoicesParams) -> Envelope {
        match self.handler.list_voices(&params) {
            Ok(groups) => {
                let count: usize = groups.iter().map(|g| g.voices.len()).sum();
                Envelope::success(
                    format!("Found {} voices", count),
                    &serde_json::json!({ "voices": groups }),
                )
            }
            Err(e) => Envelope::from_error(&e, LIST_VOICES_TOOL),
        }
    }

    fn schema_of<T: JsonSchema>() -> Arc<Map<String, Value>> {
        match serde_json::to_value(schemars::schema_for!(T)) {
            Ok(Value::Object(map)) => Arc::new(map),
            _ => Arc::new(Map::new()),
        }
    }
}

fn decode<T: DeserializeOwned>(arguments: Option<Map<String, Value>>) -> Result<T, Error> {
    serde_json::from_value(Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| Error::validation(format!("Invalid parameters: {}", e)))
}

impl ServerHandler for TtsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Text-to-speech server using the Kokoro engine. Use text_to_speech to convert \
                 text (or a text artifact) to mp3/wav audio saved as an artifact, and \
                 list_voices to see available voices by language and gender."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_ {
        async move {
            use rmcp::model::{ListToolsResult, Tool};

            Ok(ListToolsResult {
                tools: vec![
                    Tool {
                        name: Cow::Borrowed(TEXT_TO_SPEECH_TOOL),
                        description: Some(Cow::Borrowed(
                            "Convert text to speech. Provide either 'text' or 'text_file' (an artifact \
                             name, optionally name:version). Model files are downloaded on first use. \
                             The audio is saved as a new artifact with metadata.",
                        )),
                        input_schema: Self::schema_of::<TextToSpeechParams>(),
                        annotations: None,
                        icons: None,
                        meta: None,
                        output_schema: None,
                        title: None,
                    },
                    Tool {
                        name: Cow::Borrowed(LIST_VOICES_TOOL),
                        description: Some(Cow::Borrowed(
                            "List available voices, optionally filtered by language code and gender.",
                        )),
                        input_schema: Self::schema_of::<ListVoicesParams>(),
                        annotations: None,
                        icons: None,
                        meta: None,
                        output_schema: None,
                        title: None,
                    },
                ],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            let envelope = match params.name.as_ref() {
                TEXT_TO_SPEECH_TOOL => match decode::<TextToSpeechParams>(params.arguments) {
                    Ok(tool_params) => self.text_to_speech(tool_params).await,
                    Err(e) => Envelope::from_error(&e, TEXT_TO_SPEECH_TOOL),
                },
                LIST_VOICES_TOOL => match decode::<ListVoicesParams>(params.arguments) {
                    Ok(tool_params) => self.list_voices(tool_params),
                    Err(e) => Envelope::from_error(&e, LIST_VOICES_TOOL),
                },
                _ => {
                    return Err(McpError::invalid_params(format!("Unknown tool: {}", params.name), None));
                }
            };
            Ok(envelope.into_call_tool_result())
        }
    }

    fn list_resources(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            debug!("Listing resources (none available for TTS server)");
            Ok(ListResourcesResult {
                resources: vec![],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn read_resource(
        &self,
        params: rmcp::model::ReadResourceRequestParams,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            debug!(uri = %params.uri, "Reading resource");
            Err(McpError::resource_not_found(format!("Unknown resource: {}", params.uri), None))
        }
    }
}
