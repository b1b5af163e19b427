//! MCP server exposing the `host_artifact` tool.

use std::borrow::Cow;
use std::sync::Arc;

use artifact_mcp_common::artifact::ToolContext;
use artifact_mcp_common::envelope::Envelope;
use artifact_mcp_common::error::Error;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::{CallToolResult, ListResourcesResult, ReadResourceResult, ServerCapabilities, ServerInfo},
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::handler::{HostArtifactParams, HostHandler};

/// Tool name.
pub const HOST_ARTIFACT_TOOL: &str = "host_artifact";

/// MCP server for artifact hosting.
#[derive(Clone)]
pub struct HostServer {
    handler: Arc<HostHandler>,
    context: Option<ToolContext>,
}

impl HostServer {
    /// `context` supplies the artifact service and scope; without one every
    /// call fails with a configuration error.
    pub fn new(handler: HostHandler, context: Option<ToolContext>) -> Self {
        Self {
            handler: Arc::new(handler),
            context,
        }
    }

    /// Run the tool and wrap the outcome in an envelope.
    pub async fn host_artifact(&self, params: HostArtifactParams) -> Envelope {
        match self.handler.host(params, self.context.as_ref()).await {
            Ok(hosted) => Envelope::success("Artifact hosted successfully", &hosted),
            Err(e) => Envelope::from_error(&e, HOST_ARTIFACT_TOOL),
        }
    }

    fn input_schema() -> Arc<Map<String, Value>> {
        let schema = schemars::schema_for!(HostArtifactParams);
        match serde_json::to_value(&schema) {
            Ok(Value::Object(map)) => Arc::new(map),
            _ => Arc::new(Map::new()),
        }
    }
}

impl ServerHandler for HostServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Publishes artifacts on a static web server. Use host_artifact with an artifact \
                 filename (optionally suffixed with :<version>) to get a public URL."
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
                tools: vec![Tool {
                    name: Cow::Borrowed(HOST_ARTIFACT_TOOL),
                    description: Some(Cow::Borrowed(
                        "Copy an artifact (latest version, or name:version) to the web server's hosting \
                         directory and return the URL it is served at.",
                    )),
                    input_schema: Self::input_schema(),
                    annotations: None,
                    icons: None,
                    meta: None,
                    output_schema: None,
                    title: None,
                }],
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
            match params.name.as_ref() {
                HOST_ARTIFACT_TOOL => {
                    let args = Value::Object(params.arguments.unwrap_or_default());
                    let envelope = match serde_json::from_value::<HostArtifactParams>(args) {
                        Ok(tool_params) => self.host_artifact(tool_params).await,
                        Err(e) => Envelope::from_error(
                            &Error::validation(format!("Invalid parameters: {}", e)),
                            HOST_ARTIFACT_TOOL,
                        ),
                    };
                    Ok(envelope.into_call_tool_result())
                }
                _ => Err(McpError::invalid_params(format!("Unknown tool: {}", params.name), None)),
            }
        }
    }

    fn list_resources(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
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
