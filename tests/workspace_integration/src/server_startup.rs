//! Server startup tests.
//!
//! Both servers must construct without any external services and advertise
//! the tools capability.

use artifact_mcp_common::Config;
use artifact_mcp_host::{HostHandler, HostServer};
use artifact_mcp_tts::{TtsHandler, TtsServer};
use rmcp::ServerHandler;
use rmcp::model::ServerInfo;

/// The host server with no hosting directory and no artifact store.
pub fn bare_host_server() -> HostServer {
    HostServer::new(HostHandler::default(), None)
}

/// The TTS server configured from defaults with no artifact store.
pub fn bare_tts_server() -> TtsServer {
    TtsServer::new(TtsHandler::new(&Config::default()), None)
}

fn check_info(name: &str, info: &ServerInfo) -> Result<(), String> {
    if info.capabilities.tools.is_none() {
        return Err(format!("{} does not advertise tools", name));
    }
    match info.instructions.as_deref() {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(format!("{} has no instructions", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_server_starts_without_hosting() {
        let info = bare_host_server().get_info();
        check_info("host", &info).unwrap();
        assert!(info.instructions.unwrap().contains("host_artifact"));
    }

    #[test]
    fn tts_server_starts_without_store() {
        let info = bare_tts_server().get_info();
        check_info("tts", &info).unwrap();
        let instructions = info.instructions.unwrap();
        assert!(instructions.contains("text_to_speech"));
        assert!(instructions.contains("list_voices"));
    }

    #[test]
    fn servers_are_cloneable() {
        let host = bare_host_server();
        let tts = bare_tts_server();
        let _ = (host.clone(), tts.clone());
    }

    #[tokio::test]
    async fn host_server_without_hosting_reports_configuration_error() {
        let envelope = bare_host_server()
            .host_artifact(artifact_mcp_host::HostArtifactParams {
                artifact_filename: "photo.png".into(),
                ..Default::default()
            })
            .await;
        assert!(!envelope.is_success());
        assert!(envelope.message.contains("ToolContext is required"));
    }

    #[test]
    fn default_config_points_at_local_resources() {
        let config = Config::default();
        assert!(config.artifact_bucket.is_none());
        assert_eq!(config.tts_command, "kokoro-tts");
    }
}
