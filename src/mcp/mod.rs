//! MCP (Model Context Protocol) server implementation
//!
//! JSON-RPC envelopes, the tool registry, and the dispatcher shared by the
//! stdio and HTTP transports.

pub mod handler;
pub mod protocol;
pub mod registry;
pub mod tools;

pub use handler::{ToolkitHandler, UNAUTHORIZED_MESSAGE};
pub use protocol::{
    decode_request, methods, InitializeResult, McpError, McpHandler, McpRequest, McpResponse,
    McpServer, RequestContext, ToolCallResult, ToolContent, PROTOCOL_VERSION, SERVER_NAME,
};
pub use registry::{ToolDefinition, ToolDescriptor, ToolRegistry, ToolRegistryBuilder};
pub use tools::{builtin_registry, error_record, record_error, TOOL_DEFINITIONS};
