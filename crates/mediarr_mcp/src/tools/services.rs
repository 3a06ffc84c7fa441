//! media_list_services and media_system_status.

use super::{McpTool, ToolContext};
use anyhow::Result;
use async_trait::async_trait;
use mediarr_protocol::ServiceKind;
use serde_json::{json, Map, Value};

pub struct ListServicesTool;

#[async_trait]
impl McpTool for ListServicesTool {
    fn name(&self) -> &'static str {
        "media_list_services"
    }

    fn description(&self) -> &'static str {
        "List all known media services, whether each is configured, and its URL."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value, context: &ToolContext) -> Result<Value> {
        let enabled: Vec<&str> = context
            .config
            .enabled_services()
            .iter()
            .map(|s| s.as_str())
            .collect();

        let mut services = Map::new();
        for service in ServiceKind::PRIORITY {
            let url = context
                .config
                .settings(service)
                .map(|settings| settings.base_url(service));
            services.insert(
                service.as_str().to_string(),
                json!({
                    "configured": context.config.is_enabled(service),
                    "url": url,
                }),
            );
        }

        Ok(json!({
            "enabled_services": enabled,
            "services": services,
        }))
    }
}

pub struct SystemStatusTool;

#[async_trait]
impl McpTool for SystemStatusTool {
    fn name(&self) -> &'static str {
        "media_system_status"
    }

    fn description(&self) -> &'static str {
        "Probe every configured backend's status endpoint and report which \
         are online, with the classified error for those that are not."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value, context: &ToolContext) -> Result<Value> {
        let mut statuses = Map::new();
        for (service, result) in context.dispatcher.statuses().await {
            let entry = match result {
                Ok(status) => json!({ "online": true, "status": status }),
                Err(error) => json!({ "online": false, "error": error }),
            };
            statuses.insert(service.as_str().to_string(), entry);
        }
        Ok(Value::Object(statuses))
    }
}
