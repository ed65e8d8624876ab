//! MCP server module.
//!
//! This module implements the Model Context Protocol (MCP) server that exposes
//! the component catalog as four tools over newline-delimited JSON-RPC. It
//! answers the MCP handshake, lists the tools, and forwards tool calls to
//! [`CatalogTools`].

pub mod protocol;
pub mod tools;
pub mod transport;

use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::query::DEFAULT_LIMIT;
use crate::storage::CatalogHandle;
use protocol::{
    JsonRpcRequest, JsonRpcResponse, ToolCallResult, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, MCP_PROTOCOL_VERSION, PARSE_ERROR,
};
pub use tools::CatalogTools;
use transport::{LineTransport, TransportError};

/// Errors that can occur during MCP server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Tool arguments are missing, ill-typed or out of range
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// `tools/call` named a tool we do not expose
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A response could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// MCP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Name reported in `serverInfo`
    pub name: String,

    /// Version reported in `serverInfo`
    pub version: String,

    /// Search limit applied when a request omits one
    pub default_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "component-search".to_string(),
            version: crate::VERSION.to_string(),
            default_limit: DEFAULT_LIMIT,
        }
    }
}

/// MCP server instance.
pub struct McpServer {
    config: ServerConfig,
    tools: CatalogTools,
}

impl McpServer {
    /// Create a new MCP server instance.
    ///
    /// # Arguments
    /// * `config` - Server configuration
    /// * `catalog` - Shared catalog the tools read from
    pub fn new(config: ServerConfig, catalog: CatalogHandle) -> Self {
        let tools = CatalogTools::new(catalog, config.default_limit);
        Self { config, tools }
    }

    /// Serve requests until the peer closes the input stream.
    ///
    /// # Errors
    /// Returns `ServerError::Transport` if reading or writing fails
    pub async fn run<R, W>(&self, transport: &mut LineTransport<R, W>) -> ServerResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("{} v{} ready", self.config.name, self.config.version);

        while let Some(line) = transport.recv().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line) {
                transport.send(&response).await?;
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }

    /// Decode one framed message and handle it.
    ///
    /// # Returns
    /// The response to write back, or `None` for notifications
    pub fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(&request),
            Err(e) => {
                warn!("Unparseable message: {}", e);
                Some(JsonRpcResponse::error(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    /// Handle a decoded JSON-RPC request.
    ///
    /// # Returns
    /// The response, or `None` if the request is a notification. A request
    /// whose `id` is present but null is answered with a null `id`.
    pub fn handle_request(&self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            debug!("Notification: {}", request.method);
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", request.jsonrpc),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize_result()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                json!({ "tools": CatalogTools::definitions() }),
            ),
            "tools/call" => self.handle_tool_call(id, &request.params),
            other => {
                debug!("Unknown method: {}", other);
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", other))
            }
        };
        Some(response)
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": self.config.name,
                "version": self.config.version,
            }
        })
    }

    fn handle_tool_call(&self, id: Value, params: &Value) -> JsonRpcResponse {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing tool name");
        };
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
        debug!("tools/call {}", name);

        let result = match self.tools.call(name, arguments) {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => ToolCallResult::success(text),
                Err(e) => return JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
            },
            Err(ServerError::InvalidRequest(message)) => {
                warn!("Rejected {} call: {}", name, message);
                ToolCallResult::error(message)
            }
            Err(ServerError::UnknownTool(tool)) => {
                let message = format!("Unknown tool: {}", tool);
                return JsonRpcResponse::error(id, INVALID_PARAMS, message);
            }
            Err(e) => return JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }
}
