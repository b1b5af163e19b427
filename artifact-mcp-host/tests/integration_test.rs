//! Integration tests for artifact-mcp-host.
//!
//! Run with: `cargo test --package artifact-mcp-host --test integration_test`
//!
//! Everything runs locally: artifacts live in an in-memory service and the
//! hosting directory is a temporary directory.

use std::sync::Arc;

use artifact_mcp_common::artifact::{Artifact, ArtifactScope, ArtifactService, ToolContext};
use artifact_mcp_common::error::Error;
use artifact_mcp_common::store::InMemoryArtifactService;
use artifact_mcp_host::handler::{HostArtifactParams, HostHandler};
use artifact_mcp_host::hosting::{HostingServer, HostingTarget};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    store: Arc<InMemoryArtifactService>,
    ctx: ToolContext,
    handler: HostHandler,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryArtifactService::new());
    let ctx = ToolContext::new(ArtifactScope::new("app", "user", "session"), store.clone());
    let handler = HostHandler::new(Some(HostingTarget::new(dir.path(), "http://localhost:8081")));
    Fixture { dir, store, ctx, handler }
}

impl Fixture {
    async fn save(&self, name: &str, body: &[u8]) -> u64 {
        self.store
            .save_artifact(&self.ctx.scope, name, Artifact::new(body.to_vec(), "application/octet-stream"))
            .await
            .unwrap()
    }

    fn read_hosted(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.dir.path().join(name)).unwrap()
    }
}

fn params(artifact_filename: &str) -> HostArtifactParams {
    HostArtifactParams {
        artifact_filename: artifact_filename.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn hosts_latest_version_by_default() {
    let fx = fixture();
    fx.save("chart.png", b"v0").await;
    fx.save("chart.png", b"v1").await;

    let hosted = fx.handler.host(params("chart.png"), Some(&fx.ctx)).await.unwrap();

    assert_eq!(hosted.artifact_filename, "chart.png");
    assert_eq!(hosted.artifact_version, 1);
    assert_eq!(hosted.hosted_filename, "chart.png");
    assert_eq!(hosted.url, "http://localhost:8081/chart.png");
    assert_eq!(fx.read_hosted("chart.png"), b"v1");
}

#[tokio::test]
async fn hosts_explicit_version_under_custom_name() {
    let fx = fixture();
    fx.save("chart.png", b"v0").await;
    fx.save("chart.png", b"v1").await;

    let hosted = fx
        .handler
        .host(
            HostArtifactParams {
                artifact_filename: "chart.png:0".into(),
                custom_filename: Some("first-draft".into()),
                base_url: Some("https://files.example.com/".into()),
            },
            Some(&fx.ctx),
        )
        .await
        .unwrap();

    assert_eq!(hosted.artifact_version, 0);
    assert_eq!(hosted.hosted_filename, "first-draft.png");
    assert_eq!(hosted.url, "https://files.example.com/first-draft.png");
    assert_eq!(fx.read_hosted("first-draft.png"), b"v0");
}

#[tokio::test]
async fn hosting_overwrites_previous_copy() {
    let fx = fixture();
    fx.save("a.txt", b"old").await;
    fx.handler.host(params("a.txt"), Some(&fx.ctx)).await.unwrap();
    fx.save("a.txt", b"new").await;
    fx.handler.host(params("a.txt"), Some(&fx.ctx)).await.unwrap();
    assert_eq!(fx.read_hosted("a.txt"), b"new");
}

#[tokio::test]
async fn unknown_artifact_is_not_found() {
    let fx = fixture();
    let err = fx.handler.host(params("missing.png"), Some(&fx.ctx)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Artifact 'missing.png' not found.");
}

#[tokio::test]
async fn unknown_version_is_not_found() {
    let fx = fixture();
    fx.save("a.txt", b"x").await;
    let err = fx.handler.host(params("a.txt:7"), Some(&fx.ctx)).await.unwrap_err();
    assert_eq!(err.to_string(), "Content for 'a.txt' v7 not found.");
}

#[tokio::test]
async fn missing_context_or_target_is_a_configuration_error() {
    let fx = fixture();
    let err = fx.handler.host(params("a.txt"), None).await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));

    let no_server = HostHandler::new(None);
    let err = no_server.host(params("a.txt"), Some(&fx.ctx)).await.unwrap_err();
    assert!(matches!(err, Error::Configuration(ref m) if m.contains("Web server is not running")));
}

#[tokio::test]
async fn nested_artifact_name_needs_custom_filename() {
    let fx = fixture();
    fx.save("reports/q3.pdf", b"%PDF").await;

    let err = fx.handler.host(params("reports/q3.pdf"), Some(&fx.ctx)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let hosted = fx
        .handler
        .host(
            HostArtifactParams {
                artifact_filename: "reports/q3.pdf".into(),
                custom_filename: Some("q3".into()),
                base_url: None,
            },
            Some(&fx.ctx),
        )
        .await
        .unwrap();
    assert_eq!(hosted.hosted_filename, "q3.pdf");
}

#[tokio::test]
async fn long_custom_filename_is_hosted() {
    let fx = fixture();
    fx.save("a.txt", b"long name").await;
    let long_name = format!("{}.txt", "n".repeat(230));

    let hosted = fx
        .handler
        .host(
            HostArtifactParams {
                artifact_filename: "a.txt".into(),
                custom_filename: Some(long_name.clone()),
                base_url: None,
            },
            Some(&fx.ctx),
        )
        .await
        .unwrap();

    assert_eq!(hosted.hosted_filename, long_name);
    assert_eq!(fx.read_hosted(&long_name), b"long name");
}

#[tokio::test]
async fn concurrent_hosting_of_same_name_is_last_writer_wins() {
    let fx = fixture();
    let payloads: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; 64 * 1024]).collect();
    for (i, payload) in payloads.iter().enumerate() {
        fx.save(&format!("part{}.bin", i), payload).await;
    }

    let calls = (0..payloads.len()).map(|i| {
        fx.handler.host(
            HostArtifactParams {
                artifact_filename: format!("part{}.bin", i),
                custom_filename: Some("shared.bin".into()),
                base_url: None,
            },
            Some(&fx.ctx),
        )
    });
    for result in futures::future::join_all(calls).await {
        result.unwrap();
    }

    let hosted = fx.read_hosted("shared.bin");
    assert!(payloads.contains(&hosted), "hosted file is not one of the payloads");

    let leftovers = std::fs::read_dir(fx.dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[tokio::test]
async fn hosted_file_is_served_over_http() {
    let fx = fixture();
    fx.save("hello.txt", b"hello world").await;

    let server = HostingServer::bind(fx.dir.path(), "127.0.0.1", 0, None).await.unwrap();
    let target = server.target().clone();
    assert!(target.base_url.starts_with("http://127.0.0.1:"));
    server.spawn();

    let handler = HostHandler::new(Some(target));
    let hosted = handler.host(params("hello.txt"), Some(&fx.ctx)).await.unwrap();

    let response = reqwest::get(&hosted.url).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/plain; charset=utf-8");
    assert_eq!(response.text().await.unwrap(), "hello world");

    let missing = reqwest::get(format!("{}/nope.txt", handler.target().unwrap().base_url))
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}
