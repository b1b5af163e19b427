//! The `{status, message, ...fields}` result every tool returns.
//!
//! Handlers return typed results or [`Error`]; the MCP layer turns either into
//! an [`Envelope`] and sends it as JSON text content.

use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Outcome of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// A tool result.
///
/// ```
/// use artifact_mcp_common::envelope::Envelope;
///
/// let env = Envelope::error("Artifact 'x.png' not found.").with_field("tool", "host_artifact");
/// let json = serde_json::to_value(&env).unwrap();
/// assert_eq!(json["status"], "error");
/// assert_eq!(json["tool"], "host_artifact");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    pub message: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Envelope {
    /// Success envelope carrying the fields of `payload`.
    ///
    /// `payload` should serialize to a JSON object; other values are nested
    /// under a `result` field.
    pub fn success(message: impl Into<String>, payload: &impl Serialize) -> Self {
        let fields = match serde_json::to_value(payload) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => Map::new(),
            Ok(other) => Map::from_iter([("result".to_string(), other)]),
            Err(e) => {
                return Self::error(format!("An unexpected error occurred: failed to encode result: {}", e));
            }
        };

        Self {
            status: Status::Success,
            message: message.into(),
            fields,
        }
    }

    /// Error envelope with only a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            fields: Map::new(),
        }
    }

    /// Error envelope for `err`, logged according to its kind.
    ///
    /// Caller errors (not found, validation) are logged at warn level, anything
    /// else at error level with the full error chain.
    pub fn from_error(err: &Error, tool: &str) -> Self {
        if err.is_caller_error() {
            tracing::warn!(tool, error = %err, "Tool call rejected");
        } else {
            tracing::error!(tool, error = ?err, "Tool call failed");
        }
        Self::error(err.user_message())
    }

    /// Add or replace one field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Render as MCP tool output: the envelope JSON as text, flagged as an
    /// error for error status.
    pub fn into_call_tool_result(self) -> CallToolResult {
        let text = serde_json::to_string_pretty(&self)
            .unwrap_or_else(|_| format!(r#"{{"status":"error","message":{:?}}}"#, self.message));
        let content = vec![Content::text(text)];
        if self.is_success() {
            CallToolResult::success(content)
        } else {
            CallToolResult::error(content)
        }
    }
}

impl From<Envelope> for CallToolResult {
    fn from(envelope: Envelope) -> Self {
        envelope.into_call_tool_result()
    }
}
