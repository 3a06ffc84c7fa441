//! MCP server: JSON-RPC 2.0 over stdio.
//!
//! One process, one loop: read a request line, handle it, write the
//! response. Tool failures are reported as `is_error` tool results so
//! the calling agent can see them; JSON-RPC errors are reserved for
//! protocol-level problems.

use crate::protocol::{
    methods, ContentBlock, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ServerCapabilities, ServerInfo, StdioTransport, ToolCallParams,
    ToolCallResult, ToolsCapability, ToolsListResult, JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
};
use crate::tools::{ToolContext, ToolRegistry};
use anyhow::Result;
use mediarr_protocol::SuiteConfig;
use serde_json::Value;
use tracing::{error, info};

/// Server identity reported in the initialize handshake.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    pub server_name: String,
    pub server_version: String,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            server_name: "mediarr-mcp".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// The MCP server.
pub struct McpServer {
    config: McpServerConfig,
    context: ToolContext,
    tools: ToolRegistry,
    initialized: bool,
}

impl McpServer {
    pub fn new(suite: SuiteConfig) -> Result<Self> {
        let context = ToolContext::new(suite)?;
        Ok(Self {
            config: McpServerConfig::default(),
            context,
            tools: ToolRegistry::new(),
            initialized: false,
        })
    }

    pub fn with_server_config(mut self, config: McpServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Run until stdin closes.
    pub async fn run(&mut self) -> Result<()> {
        let mut transport = StdioTransport::new();
        info!("MCP server starting");

        while let Some(line) = transport.read_line().await? {
            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(e) => {
                    let response = JsonRpcResponse::error(
                        None,
                        JsonRpcError::parse_error(format!("Invalid JSON: {e}")),
                    );
                    transport.write_response(&response).await?;
                    continue;
                }
            };

            let response = self.handle_request(request).await;
            if response.is_none() {
                continue;
            }
            transport.write_response(&response).await?;
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle one JSON-RPC request.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        if request.jsonrpc != JSONRPC_VERSION {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request(format!(
                    "Invalid JSON-RPC version: {}",
                    request.jsonrpc
                )),
            );
        }

        match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(request),
            methods::INITIALIZED => {
                // A notification carries no id and gets no response.
                if request.id.is_none() {
                    JsonRpcResponse::none()
                } else {
                    JsonRpcResponse::success(request.id, Value::Null)
                }
            }
            methods::TOOLS_LIST => self.handle_tools_list(request),
            methods::TOOLS_CALL => self.handle_tools_call(request).await,
            methods::PING => {
                JsonRpcResponse::success(request.id, Value::Object(Default::default()))
            }
            other => JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(other)),
        }
    }

    fn handle_initialize(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: InitializeParams = match request.params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        JsonRpcError::invalid_params(format!("Invalid initialize params: {e}")),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params("Missing initialize params"),
                );
            }
        };

        info!(
            "initialize from {} v{} (protocol {})",
            params.client_info.name, params.client_info.version, params.protocol_version
        );
        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.config.server_name.clone(),
                version: self.config.server_version.clone(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => JsonRpcResponse::error(
                request.id,
                JsonRpcError::internal_error(format!("Failed to serialize result: {e}")),
            ),
        }
    }

    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.tools.list_tools(),
        };
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => JsonRpcResponse::error(
                request.id,
                JsonRpcError::internal_error(format!("Failed to serialize tools: {e}")),
            ),
        }
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if !self.initialized {
            return JsonRpcResponse::error(request.id, JsonRpcError::not_initialized());
        }

        let params: ToolCallParams = match request.params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        JsonRpcError::invalid_params(format!("Invalid tool call params: {e}")),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params("Missing tool call params"),
                );
            }
        };

        info!("tool call: {}", params.name);

        let tool_result = match self
            .tools
            .call_tool(&params.name, params.arguments, &self.context)
            .await
        {
            Ok(value) => {
                let text = serde_json::to_string(&value)
                    .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"));
                ToolCallResult {
                    content: vec![ContentBlock::text(text)],
                    is_error: false,
                }
            }
            Err(e) => {
                error!("tool {} failed: {e}", params.name);
                ToolCallResult {
                    content: vec![ContentBlock::text(format!("Error: {e}"))],
                    is_error: true,
                }
            }
        };

        match serde_json::to_value(tool_result) {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => JsonRpcResponse::error(
                request.id,
                JsonRpcError::internal_error(format!("Failed to serialize tool result: {e}")),
            ),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RequestId;
    use serde_json::json;

    fn server() -> McpServer {
        McpServer::new(SuiteConfig::default()).unwrap()
    }

    fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(RequestId::Number(id)),
            method: method.to_string(),
            params,
        }
    }

    fn initialize_params() -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {"name": "test-client", "version": "0.0.1"}
        })
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let mut server = server();
        let response = server
            .handle_request(request(1, methods::INITIALIZE, Some(initialize_params())))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "mediarr-mcp");
    }

    #[tokio::test]
    async fn test_tools_list_contains_execute() {
        let mut server = server();
        let response = server
            .handle_request(request(1, methods::TOOLS_LIST, None))
            .await;

        let tools = response.result.unwrap()["tools"].clone();
        let names: Vec<String> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert!(names.contains(&"media_execute".to_string()));
        assert!(names.contains(&"media_explain_intent".to_string()));
    }

    #[tokio::test]
    async fn test_tools_call_requires_initialize() {
        let mut server = server();
        let response = server
            .handle_request(request(
                1,
                methods::TOOLS_CALL,
                Some(json!({"name": "media_list_services", "arguments": {}})),
            ))
            .await;
        assert_eq!(response.error.unwrap().code, -32002);
    }

    #[tokio::test]
    async fn test_explain_tool_roundtrip() {
        let mut server = server();
        server
            .handle_request(request(1, methods::INITIALIZE, Some(initialize_params())))
            .await;

        let response = server
            .handle_request(request(
                2,
                methods::TOOLS_CALL,
                Some(json!({
                    "name": "media_explain_intent",
                    "arguments": {"query": "download English subtitles for Dune"}
                })),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], Value::Null);
        let text = result["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        assert_eq!(payload["intent"]["service"], "bazarr");
        assert_eq!(payload["intent"]["operation"], "download");
        assert_eq!(payload["intent"]["context"]["language"], "English");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let mut server = server();
        server
            .handle_request(request(1, methods::INITIALIZE, Some(initialize_params())))
            .await;

        let response = server
            .handle_request(request(
                2,
                methods::TOOLS_CALL,
                Some(json!({"name": "bogus_tool", "arguments": {}})),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut server = server();
        let response = server
            .handle_request(request(1, "resources/list", None))
            .await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_initialized_notification_gets_no_response() {
        let mut server = server();
        let response = server
            .handle_request(JsonRpcRequest {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id: None,
                method: methods::INITIALIZED.to_string(),
                params: None,
            })
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_execute_with_no_backends_asks_for_clarification() {
        let mut server = server();
        server
            .handle_request(request(1, methods::INITIALIZE, Some(initialize_params())))
            .await;

        let response = server
            .handle_request(request(
                2,
                methods::TOOLS_CALL,
                Some(json!({
                    "name": "media_execute",
                    "arguments": {"query": "what time is it"}
                })),
            ))
            .await;

        let result = response.result.unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        assert_eq!(payload["outcome"], "needs_clarification");
    }
}
