//! media_execute - natural-language execution with intelligent routing.

use super::{require_str, McpTool, ToolContext};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

pub struct ExecuteTool;

#[async_trait]
impl McpTool for ExecuteTool {
    fn name(&self) -> &'static str {
        "media_execute"
    }

    fn description(&self) -> &'static str {
        "Execute media-suite operations from natural language. Routes to the \
         right backend (Sonarr, Radarr, Prowlarr, Bazarr, Overseerr or Plex) \
         based on the request. Examples: 'add Breaking Bad', 'search for The \
         Matrix', 'download English subtitles for Dune', 'list all indexers'."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Natural language description of what to do"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> Result<Value> {
        let query = require_str(&args, "query")?;
        let intent = context.router.parse_intent(query);
        info!(
            service = %intent.service,
            operation = %intent.operation,
            confidence = intent.confidence,
            "routing query"
        );

        let outcome = context.dispatcher.dispatch(&intent).await;
        let mut value = serde_json::to_value(outcome)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("confidence".to_string(), json!(intent.confidence));
        }
        Ok(value)
    }
}
