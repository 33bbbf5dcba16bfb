//! MCP JSON-RPC protocol implementation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};

use crate::error::{codes, Result, ToolkitError};

/// Protocol tag carried by every envelope
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision advertised by `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP JSON-RPC request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl McpRequest {
    /// Build a request envelope
    pub fn new(id: Option<Value>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Requests without an id in the `notifications/` namespace expect no reply
    pub fn is_notification(&self) -> bool {
        self.id.is_none() && self.method.starts_with(methods::NOTIFICATION_PREFIX)
    }
}

/// MCP JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

/// MCP error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Create error from ToolkitError
    pub fn from_error(id: Option<Value>, err: ToolkitError) -> Self {
        Self::error(id, err.code(), err.to_string())
    }

    /// Error code, if this is an error response
    pub fn error_code(&self) -> Option<i64> {
        self.error.as_ref().map(|e| e.code)
    }
}

/// Decode one envelope from raw bytes.
///
/// Malformed input is answered with a ready-made error response instead of
/// failing: `-32700` for bytes that are not JSON, `-32600` for JSON that is
/// not a request envelope (the id is echoed when it can be recovered).
pub fn decode_request(raw: &[u8]) -> std::result::Result<McpRequest, McpResponse> {
    let value: Value = serde_json::from_slice(raw).map_err(|e| {
        McpResponse::error(None, codes::PARSE_ERROR, format!("Parse error: {}", e))
    })?;

    let raw_id = value.get("id").filter(|v| !v.is_null());
    let id = raw_id.filter(|v| is_valid_id(v)).cloned();
    let invalid = |reason: &str| {
        McpResponse::error(
            id.clone(),
            codes::INVALID_REQUEST,
            format!("Invalid Request: {}", reason),
        )
    };

    if !value.is_object() {
        return Err(invalid("expected a JSON object"));
    }
    if value.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(invalid("jsonrpc must be \"2.0\""));
    }
    if !value.get("method").is_some_and(Value::is_string) {
        return Err(invalid("method must be a string"));
    }
    if raw_id.is_some() && id.is_none() {
        return Err(invalid("id must be a number or a string"));
    }

    let mut request: McpRequest =
        serde_json::from_value(value).map_err(|e| invalid(&e.to_string()))?;
    if request.id.as_ref().is_some_and(Value::is_null) {
        request.id = None;
    }
    Ok(request)
}

fn is_valid_id(id: &Value) -> bool {
    id.is_number() || id.is_string()
}

/// Transport-level facts a handler may consult
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Credential carried by `X-API-Key` / `Authorization` headers
    pub header_credential: Option<String>,
}

impl RequestContext {
    /// Context for the stdio transport, which carries no headers
    pub fn local() -> Self {
        Self::default()
    }

    pub fn with_header_credential(credential: Option<String>) -> Self {
        Self {
            header_credential: credential,
        }
    }
}

/// Trait for handling MCP requests
pub trait McpHandler: Send + Sync {
    /// Handle one request. Returns `None` for notifications.
    fn handle_request(&self, request: McpRequest, context: &RequestContext)
        -> Option<McpResponse>;
}

/// MCP server handling stdio communication
pub struct McpServer<H>
where
    H: McpHandler,
{
    handler: H,
}

impl<H: McpHandler> McpServer<H> {
    /// Create a new MCP server
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// Run the server, reading from stdin and writing to stdout
    pub fn run(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(BufReader::new(stdin.lock()), stdout.lock())
    }

    /// Serve line-delimited envelopes until `reader` reaches EOF
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<()> {
        let context = RequestContext::local();
        let mut line = Vec::new();

        loop {
            line.clear();
            // Raw bytes: a line that is not UTF-8 still gets a parse error
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break, // EOF
                Ok(_) => {
                    let trimmed = line.trim_ascii();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let response = match decode_request(trimmed) {
                        Ok(request) => self.handler.handle_request(request, &context),
                        Err(response) => {
                            tracing::warn!("Rejected malformed envelope on stdio");
                            Some(response)
                        }
                    };

                    if let Some(response) = response {
                        let response_json = serde_json::to_string(&response)?;
                        writeln!(writer, "{}", response_json)?;
                        writer.flush()?;
                    }
                }
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Standard MCP methods
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const LIST_TOOLS: &str = "tools/list";
    pub const CALL_TOOL: &str = "tools/call";
    pub const NOTIFICATION_PREFIX: &str = "notifications/";
}

/// MCP initialize result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// Server capabilities.
///
/// Only `tools` is backed by an implementation; the others are advertised
/// so clients that probe for them still connect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
    pub logging: Option<Value>,
    pub prompts: Option<ListChangedCapability>,
    pub resources: Option<ResourcesCapability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsCapability {
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListChangedCapability {
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesCapability {
    pub subscribe: bool,
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Server info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "productivity-toolkit";

impl Default for InitializeResult {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
                logging: Some(Value::Object(Default::default())),
                prompts: Some(ListChangedCapability {
                    list_changed: false,
                }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// Tool call result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl ToolCallResult {
    /// Create a text result
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: None,
        }
    }

    /// Create a JSON result
    pub fn json(value: &impl Serialize) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_default();
        Self::text(text)
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }

    /// Attach an inline image block
    pub fn with_image(mut self, data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        self.content.push(ToolContent::Image {
            data: data.into(),
            mime_type: mime_type.into(),
        });
        self
    }
}
