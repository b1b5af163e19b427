//! Unit tests for server builder utilities.

use std::time::Duration;

use rmcp::ServerHandler;

use super::server::{McpServerBuilder, ServerError, shutdown_channel};
use super::transport::Transport;

#[derive(Clone)]
struct NoTools;

impl ServerHandler for NoTools {}

#[test]
fn bind_failure_names_address() {
    let err = ServerError::BindFailed {
        addr: "0.0.0.0:8080".to_string(),
        message: "Address already in use".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("0.0.0.0:8080"));
    assert!(msg.contains("Address already in use"));
}

#[test]
fn io_errors_convert() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ServerError = io_err.into();
    assert!(matches!(err, ServerError::Io(_)));
}

#[tokio::test]
async fn http_server_reports_port_in_use() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();

    let (_tx, rx) = shutdown_channel();
    let err = McpServerBuilder::new(NoTools)
        .with_transport(Transport::http("127.0.0.1", port))
        .with_shutdown(rx)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, ServerError::BindFailed { ref addr, .. } if addr.ends_with(&port.to_string())));
}

#[tokio::test]
async fn http_server_stops_on_shutdown_signal() {
    let spare = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = spare.local_addr().unwrap().port();
    drop(spare);

    let (tx, rx) = shutdown_channel();
    let server = tokio::spawn(
        McpServerBuilder::new(NoTools)
            .with_transport(Transport::http("127.0.0.1", port))
            .with_shutdown(rx)
            .run(),
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    let _ = tx.send(());

    let result = tokio::time::timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    assert!(result.is_ok());
}
