//! media_call - direct catalog invocation for callers that already know
//! the target service and operation.

use super::{require_str, McpTool, ToolContext};
use anyhow::Result;
use async_trait::async_trait;
use mediarr_protocol::{IntentContext, OperationKind, ServiceKind};
use serde_json::{json, Value};

pub struct CallTool;

#[async_trait]
impl McpTool for CallTool {
    fn name(&self) -> &'static str {
        "media_call"
    }

    fn description(&self) -> &'static str {
        "Invoke a specific catalog operation on a specific service, \
         bypassing intent routing. Params may carry title, year, quality, \
         season, episode and language."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "service": {
                    "type": "string",
                    "enum": ["sonarr", "radarr", "prowlarr", "bazarr", "overseerr", "plex"],
                    "description": "Target service"
                },
                "operation": {
                    "type": "string",
                    "description": "Operation name, e.g. search, list, sync, backup"
                },
                "params": {
                    "type": "object",
                    "description": "Optional context fields (title, year, ...)"
                }
            },
            "required": ["service", "operation"]
        })
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> Result<Value> {
        let service: ServiceKind = require_str(&args, "service")?
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        let operation: OperationKind = require_str(&args, "operation")?
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        let call_context: IntentContext = match args.get("params") {
            Some(params) if !params.is_null() => serde_json::from_value(params.clone())
                .map_err(|e| anyhow::anyhow!("Invalid params: {e}"))?,
            _ => IntentContext::default(),
        };

        let outcome = context
            .dispatcher
            .call(service, operation, &call_context)
            .await;
        Ok(serde_json::to_value(outcome)?)
    }
}
