//! media_explain_intent - show how a query would be routed, without
//! executing anything.

use super::{require_str, McpTool, ToolContext};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct ExplainIntentTool;

#[async_trait]
impl McpTool for ExplainIntentTool {
    fn name(&self) -> &'static str {
        "media_explain_intent"
    }

    fn description(&self) -> &'static str {
        "Explain how a natural-language query would be interpreted and \
         routed: detected service, operation, extracted context, matched \
         keywords and confidence. Makes no backend call."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Natural language query to explain"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> Result<Value> {
        let query = require_str(&args, "query")?;
        let intent = context.router.parse_intent(query);
        let explanation = context.router.explain(query);
        Ok(json!({
            "intent": intent,
            "explanation": explanation,
        }))
    }
}
