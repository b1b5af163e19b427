//! Workspace-level integration tests.
//!
//! These tests exercise both MCP servers together: startup, tool schemas,
//! parameter validation, and the shape of the results they return.

pub mod input_validation;
pub mod output_format;
pub mod server_startup;
pub mod tool_schema;
