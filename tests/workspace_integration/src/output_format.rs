//! Output format tests.
//!
//! Every tool answers with a single text content item holding the
//! `{status, message, ...}` JSON envelope; error envelopes set `is_error`.

use rmcp::model::{CallToolResult, RawContent};
use serde_json::Value;

/// Check a tool result and return the envelope it carries.
pub fn envelope_of(result: &CallToolResult) -> Result<Value, String> {
    if result.content.len() != 1 {
        return Err(format!("Expected one content item, got {}", result.content.len()));
    }
    let text = match &result.content[0].raw {
        RawContent::Text(text) => &text.text,
        other => return Err(format!("Expected text content, got {:?}", other)),
    };

    let value: Value = serde_json::from_str(text).map_err(|e| format!("Content is not JSON: {}", e))?;
    let status = value["status"]
        .as_str()
        .ok_or_else(|| "Envelope has no status".to_string())?;
    if !value["message"].is_string() {
        return Err("Envelope has no message".to_string());
    }

    let flagged_error = result.is_error.unwrap_or(false);
    match (status, flagged_error) {
        ("success", false) | ("error", true) => Ok(value),
        _ => Err(format!("Status '{}' does not match is_error={}", status, flagged_error)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use artifact_mcp_common::artifact::{Artifact, ArtifactScope, ArtifactService, ToolContext};
    use artifact_mcp_common::{Envelope, InMemoryArtifactService};
    use artifact_mcp_host::{HostArtifactParams, HostHandler, HostServer, HostingTarget};
    use artifact_mcp_tts::ListVoicesParams;
    use artifact_mcp_tts::catalog::Gender;

    use super::*;
    use crate::server_startup::bare_tts_server;

    #[test]
    fn success_envelope_is_flat_json_text() {
        let payload = serde_json::json!({ "url": "http://localhost:8081/a.png" });
        let result = Envelope::success("Artifact hosted successfully", &payload).into_call_tool_result();
        let value = envelope_of(&result).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["url"], "http://localhost:8081/a.png");
    }

    #[test]
    fn error_envelope_sets_is_error() {
        let result = Envelope::error("Artifact 'a.png' not found.").into_call_tool_result();
        let value = envelope_of(&result).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn list_voices_result_has_grouped_voices() {
        let envelope = bare_tts_server().list_voices(ListVoicesParams {
            language: Some("en-gb".into()),
            gender: Some(Gender::Male),
        });
        let value = envelope_of(&envelope.into_call_tool_result()).unwrap();
        let groups = value["voices"].as_array().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["gender"], "male");
        assert!(groups[0]["voices"].as_array().unwrap().iter().any(|v| v == "bm_george"));
    }

    #[test]
    fn unknown_language_is_an_error_result() {
        let envelope = bare_tts_server().list_voices(ListVoicesParams {
            language: Some("xx".into()),
            gender: None,
        });
        let value = envelope_of(&envelope.into_call_tool_result()).unwrap();
        assert!(value["message"].as_str().unwrap().contains("Unknown language 'xx'"));
    }

    #[tokio::test]
    async fn hosted_artifact_result_carries_url_and_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryArtifactService::new());
        let scope = ArtifactScope::new("app", "alice", "s1");
        store
            .save_artifact(&scope, "chart.png", Artifact::new(b"png".to_vec(), "image/png"))
            .await
            .unwrap();

        let server = HostServer::new(
            HostHandler::new(Some(HostingTarget::new(dir.path(), "http://localhost:8081"))),
            Some(ToolContext::new(scope, store)),
        );
        let envelope = server
            .host_artifact(HostArtifactParams {
                artifact_filename: "chart.png".into(),
                ..Default::default()
            })
            .await;

        let value = envelope_of(&envelope.into_call_tool_result()).unwrap();
        assert_eq!(value["message"], "Artifact hosted successfully");
        assert_eq!(value["url"], "http://localhost:8081/chart.png");
        assert_eq!(value["artifact_version"], 0);
        assert_eq!(value["hosted_filename"], "chart.png");
        assert_eq!(std::fs::read(dir.path().join("chart.png")).unwrap(), b"png");
    }

    #[tokio::test]
    async fn missing_artifact_result_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let server = HostServer::new(
            HostHandler::new(Some(HostingTarget::new(dir.path(), "http://localhost:8081"))),
            Some(ToolContext::new(
                ArtifactScope::new("app", "alice", "s1"),
                Arc::new(InMemoryArtifactService::new()),
            )),
        );
        let envelope = server
            .host_artifact(HostArtifactParams {
                artifact_filename: "ghost.png".into(),
                ..Default::default()
            })
            .await;
        let value = envelope_of(&envelope.into_call_tool_result()).unwrap();
        assert_eq!(value["status"], "error");
        assert!(value["message"].as_str().unwrap().contains("ghost.png"));
    }
}
