//! Artifact MCP Common Library
//!
//! Shared pieces of the artifact tool servers: versioned artifact references and
//! resolution, artifact service backends, configuration, error handling, the
//! result envelope, tracing, and the MCP transport/server builder.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod artifact;
pub mod auth;
pub mod config;
pub mod content_type;
pub mod envelope;
pub mod error;
pub mod gcs;
pub mod server;
pub mod store;
pub mod tracing;
pub mod transport;

#[cfg(test)]
mod error_test;
#[cfg(test)]
mod server_test;

pub use artifact::{
    Artifact, ArtifactRef, ArtifactScope, ArtifactService, Blocking, BlockingArtifactService, ResolvedArtifact,
    SavedArtifact, ToolContext, resolve, save_artifact_with_metadata,
};
pub use config::Config;
pub use envelope::{Envelope, Status};
pub use error::{AuthError, ConfigError, Error, GcsError, GcsOperation, Result};
pub use server::{McpServerBuilder, ServerError, shutdown_channel};
pub use store::{GcsArtifactService, InMemoryArtifactService};
pub use transport::{Transport, TransportArgs, TransportMode};
