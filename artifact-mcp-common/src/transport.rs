//! MCP transport selection.
//!
//! Tool servers speak MCP either over stdio (the default, for agent hosts that
//! spawn the server as a subprocess) or over streamable HTTP at `/mcp`.
//!
//! ```
//! use artifact_mcp_common::transport::{Transport, TransportArgs};
//! use clap::Parser;
//!
//! #[derive(Parser)]
//! struct Args {
//!     #[command(flatten)]
//!     transport: TransportArgs,
//! }
//!
//! let args = Args::parse_from(["server", "--transport", "http", "--port", "3000"]);
//! assert_eq!(args.transport.into_transport(), Transport::http("0.0.0.0", 3000));
//! ```

use std::fmt;

use clap::{Args, ValueEnum};

/// Where the MCP server listens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Transport {
    /// Standard input/output.
    #[default]
    Stdio,
    /// Streamable HTTP on `bind:port`.
    Http { bind: String, port: u16 },
}

impl Transport {
    pub fn stdio() -> Self {
        Transport::Stdio
    }

    pub fn http(bind: impl Into<String>, port: u16) -> Self {
        Transport::Http {
            bind: bind.into(),
            port,
        }
    }

    pub fn is_stdio(&self) -> bool {
        matches!(self, Transport::Stdio)
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Transport::Http { .. })
    }

    /// Listening port for HTTP, `None` for stdio.
    pub fn port(&self) -> Option<u16> {
        match self {
            Transport::Stdio => None,
            Transport::Http { port, .. } => Some(*port),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Http { bind, port } => write!(f, "http ({}:{})", bind, port),
        }
    }
}

/// Transport mode parsed from command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    #[default]
    Stdio,
    Http,
}

/// Command-line transport options, meant to be `#[command(flatten)]`ed.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TransportArgs {
    /// Transport mode: stdio or http
    #[arg(long, value_enum, default_value_t = TransportMode::Stdio, ignore_case = true)]
    pub transport: TransportMode,

    /// Address for the HTTP transport
    #[arg(long = "bind", env = "MCP_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port for the HTTP transport
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
}

impl TransportArgs {
    /// Convert command-line arguments into a Transport configuration.
    pub fn into_transport(self) -> Transport {
        match self.transport {
            TransportMode::Stdio => Transport::Stdio,
            TransportMode::Http => Transport::Http {
                bind: self.bind,
                port: self.port,
            },
        }
    }
}

impl Default for TransportArgs {
    fn default() -> Self {
        Self {
            transport: TransportMode::Stdio,
            bind: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}
