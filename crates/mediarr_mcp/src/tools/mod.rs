//! MCP tool implementations.
//!
//! Each tool exposes one Mediarr capability; all of them are registered
//! in the [`ToolRegistry`] and dispatched by name. Tool failures become
//! `is_error` tool results, never JSON-RPC errors, so agent callers can
//! read them.

mod call;
mod execute;
mod explain;
mod registry;
mod services;

pub use registry::ToolRegistry;

use crate::protocol::ToolDefinition;
use anyhow::Result;
use async_trait::async_trait;
use mediarr_dispatch::Dispatcher;
use mediarr_protocol::SuiteConfig;
use mediarr_router::IntentRouter;
use serde_json::Value;

/// Shared state every tool call receives.
pub struct ToolContext {
    pub config: SuiteConfig,
    pub router: IntentRouter,
    pub dispatcher: Dispatcher,
}

impl ToolContext {
    pub fn new(config: SuiteConfig) -> Result<Self> {
        let dispatcher = Dispatcher::from_config(&config)?;
        Ok(Self {
            config,
            router: IntentRouter::new(),
            dispatcher,
        })
    }
}

/// One MCP tool.
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g. "media_execute").
    fn name(&self) -> &'static str;

    /// Human-readable description shown to the agent.
    fn description(&self) -> &'static str;

    /// JSON Schema for the input parameters.
    fn input_schema(&self) -> Value;

    /// Execute the tool.
    async fn execute(&self, args: Value, context: &ToolContext) -> Result<Value>;

    /// Definition for tools/list.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Pull a required string argument out of a tool's args object.
fn require_str<'a>(args: &'a Value, name: &str) -> Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {name}"))
}
