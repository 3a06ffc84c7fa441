//! MCP server for the Mediarr suite.
//!
//! Exposes the intent router and dispatcher as Model Context Protocol
//! tools over JSON-RPC 2.0 on stdio.

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::{McpServer, McpServerConfig};
pub use tools::{McpTool, ToolContext, ToolRegistry};
