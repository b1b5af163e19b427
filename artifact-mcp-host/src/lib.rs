//! Artifact MCP Host Server Library
//!
//! Publishes versioned artifacts to a static web-hosting directory and returns
//! the URL each one is served at.

pub mod handler;
pub mod hosting;
pub mod server;

pub use handler::{HostArtifactParams, HostHandler, HostedArtifact};
pub use hosting::{HostingServer, HostingTarget};
pub use server::HostServer;
