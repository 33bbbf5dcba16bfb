//! Protocol dispatcher
//!
//! Resolves `initialize`, `tools/list` and `tools/call` against the tool
//! registry and the API key gate. `tools/call` is the only method that
//! requires a credential.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::{json, Value};

use super::protocol::{
    methods, InitializeResult, McpHandler, McpRequest, McpResponse, RequestContext,
    ToolCallResult,
};
use super::registry::{ToolDefinition, ToolRegistry};
use super::tools::record_error;
use crate::auth::{body_credential, ApiKeyGate, API_KEY_FIELD};
use crate::error::{codes, Result, ToolkitError};

/// Message returned for every failed credential check
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing API key";

/// MCP request handler for the toolkit
#[derive(Debug, Clone)]
pub struct ToolkitHandler {
    registry: ToolRegistry,
    gate: ApiKeyGate,
}

impl ToolkitHandler {
    pub fn new(registry: ToolRegistry, gate: ApiKeyGate) -> Self {
        Self { registry, gate }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &ApiKeyGate {
        &self.gate
    }

    /// Run a tool's handler, converting panics into internal errors
    pub fn invoke(&self, tool: &ToolDefinition, arguments: &Value) -> Result<Value> {
        match catch_unwind(AssertUnwindSafe(|| tool.invoke(arguments))) {
            Ok(result) => result,
            Err(_) => Err(ToolkitError::Internal(format!(
                "tool '{}' panicked",
                tool.name()
            ))),
        }
    }

    fn tools_list(&self, id: Option<Value>) -> McpResponse {
        McpResponse::success(id, json!({"tools": self.registry.list()}))
    }

    fn tools_call(
        &self,
        id: Option<Value>,
        params: &Value,
        context: &RequestContext,
    ) -> McpResponse {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return McpResponse::from_error(
                id,
                ToolkitError::InvalidParams("Missing tool name".to_string()),
            );
        };
        let mut arguments = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(args @ Value::Object(_)) => args.clone(),
            Some(_) => {
                return McpResponse::from_error(
                    id,
                    ToolkitError::InvalidParams("Tool arguments must be an object".to_string()),
                )
            }
        };

        let credential = body_credential(&arguments).or_else(|| context.header_credential.clone());
        if !self.gate.validate(credential.as_deref()) {
            tracing::warn!(tool = name, "Rejected tool call with invalid API key");
            return McpResponse::from_error(
                id,
                ToolkitError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()),
            );
        }

        let Some(tool) = self.registry.lookup(name) else {
            return McpResponse::from_error(id, ToolkitError::UnknownTool(name.to_string()));
        };

        if let (Some(object), Some(credential)) = (arguments.as_object_mut(), credential) {
            object.insert(API_KEY_FIELD.to_string(), Value::String(credential));
        }

        tracing::info!(tool = name, "Calling tool");
        match self.invoke(tool, &arguments) {
            Ok(record) => {
                if let Some(message) = record_error(&record) {
                    tracing::debug!(tool = name, error = %message, "Tool reported an error");
                    return McpResponse::success(id, json!(ToolCallResult::error(message)));
                }
                McpResponse::success(id, json!(tool_result(&record)))
            }
            Err(e) => {
                tracing::error!(tool = name, "Tool failed: {}", e);
                // any handler fault is internal, whatever its variant
                McpResponse::error(id, codes::INTERNAL_ERROR, e.to_string())
            }
        }
    }
}

/// Text payload of the record, plus an inline image for PNG QR codes
fn tool_result(record: &Value) -> ToolCallResult {
    let result = ToolCallResult::json(record);
    match (
        record.get("mimeType").and_then(Value::as_str),
        record.get("qrCode").and_then(Value::as_str),
    ) {
        (Some(mime @ "image/png"), Some(data)) => result.with_image(data, mime),
        _ => result,
    }
}

impl McpHandler for ToolkitHandler {
    fn handle_request(
        &self,
        request: McpRequest,
        context: &RequestContext,
    ) -> Option<McpResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Received notification");
            return None;
        }

        tracing::debug!(method = %request.method, "Handling request");
        let response = match request.method.as_str() {
            methods::INITIALIZE => {
                let result = InitializeResult::default();
                McpResponse::success(request.id, json!(result))
            }
            methods::LIST_TOOLS => self.tools_list(request.id),
            methods::CALL_TOOL => self.tools_call(request.id, &request.params, context),
            _ => McpResponse::error(
                request.id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::tools::builtin_registry;
    use crate::mcp::ToolContent;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const KEY: &str = "test-key";

    fn handler() -> ToolkitHandler {
        ToolkitHandler::new(builtin_registry().unwrap(), ApiKeyGate::new(KEY).unwrap())
    }

    fn call(
        handler: &ToolkitHandler,
        id: Value,
        params: Value,
        header: Option<&str>,
    ) -> McpResponse {
        let request = McpRequest::new(Some(id), methods::CALL_TOOL, params);
        let context = RequestContext::with_header_credential(header.map(str::to_string));
        handler.handle_request(request, &context).unwrap()
    }

    fn text_of(response: &McpResponse) -> String {
        let result: ToolCallResult =
            serde_json::from_value(response.result.clone().unwrap()).unwrap();
        match &result.content[0] {
            ToolContent::Text { text } => text.clone(),
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_initialize_without_credentials() {
        let response = handler()
            .handle_request(
                McpRequest::new(Some(json!(1)), methods::INITIALIZE, json!({})),
                &RequestContext::local(),
            )
            .unwrap();
        assert_eq!(response.id, Some(json!(1)));
        assert_eq!(response.result.unwrap()["serverInfo"]["name"], "productivity-toolkit");
    }

    #[test]
    fn test_tools_list_is_stable() {
        let h = handler();
        let list = |id| {
            let resp = h
                .handle_request(
                    McpRequest::new(Some(json!(id)), methods::LIST_TOOLS, Value::Null),
                    &RequestContext::local(),
                )
                .unwrap();
            serde_json::to_string(&resp.result.unwrap()["tools"]).unwrap()
        };
        assert_eq!(list(1), list(2));
    }

    #[test]
    fn test_uuid_call() {
        let response = call(
            &handler(),
            json!("req-1"),
            json!({"name": "generate-uuid", "arguments": {"count": 3, "apiKey": KEY}}),
            None,
        );
        assert_eq!(response.id, Some(json!("req-1")));
        assert!(response.error.is_none());
        let record: Value = serde_json::from_str(&text_of(&response)).unwrap();
        assert_eq!(record["count"], 3);
        assert_eq!(record["uuids"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_header_credential_accepted() {
        let response = call(
            &handler(),
            json!(2),
            json!({"name": "generate-password", "arguments": {"length": 12}}),
            Some(KEY),
        );
        assert!(response.error.is_none());
    }

    #[test]
    fn test_argument_credential_beats_header() {
        let response = call(
            &handler(),
            json!(2),
            json!({"name": "generate-password", "arguments": {"apiKey": "wrong"}}),
            Some(KEY),
        );
        assert_eq!(response.error_code(), Some(codes::UNAUTHORIZED));
        assert_eq!(response.error.unwrap().message, UNAUTHORIZED_MESSAGE);
    }

    #[test]
    fn test_empty_argument_credential_falls_back_to_header() {
        let response = call(
            &handler(),
            json!(2),
            json!({"name": "generate-uuid", "arguments": {"apiKey": ""}}),
            Some(KEY),
        );
        assert!(response.error.is_none());
    }

    #[test]
    fn test_auth_checked_before_lookup() {
        let response = call(&handler(), json!(3), json!({"name": "nope", "arguments": {}}), None);
        assert_eq!(response.error_code(), Some(codes::UNAUTHORIZED));

        let response = call(&handler(), json!(3), json!({"name": "nope", "arguments": {}}), Some(KEY));
        assert_eq!(response.error_code(), Some(codes::METHOD_NOT_FOUND));
        assert_eq!(response.error.unwrap().message, "Unknown tool: nope");
    }

    #[test]
    fn test_unauthorized_never_invokes_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = ToolRegistry::builder()
            .register(ToolDefinition::new(
                "count",
                "Counter",
                "counts calls",
                json!({"type": "object"}),
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({"ok": true}))
                },
            ))
            .unwrap()
            .build();
        let h = ToolkitHandler::new(registry, ApiKeyGate::new(KEY).unwrap());

        call(&h, json!(1), json!({"name": "count", "arguments": {}}), None);
        call(&h, json!(2), json!({"name": "count", "arguments": {"apiKey": "bad"}}), None);
        call(&h, json!(3), json!({"name": "count"}), Some("bad"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        call(&h, json!(4), json!({"name": "count"}), Some(KEY));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_credential_reinjected() {
        let registry = ToolRegistry::builder()
            .register(ToolDefinition::new(
                "echo",
                "Echo",
                "returns arguments",
                json!({"type": "object"}),
                |args| Ok(args.clone()),
            ))
            .unwrap()
            .build();
        let h = ToolkitHandler::new(registry, ApiKeyGate::new(KEY).unwrap());
        let response = call(&h, json!(1), json!({"name": "echo", "arguments": {"x": 1}}), Some(KEY));
        let record: Value = serde_json::from_str(&text_of(&response)).unwrap();
        assert_eq!(record, json!({"x": 1, "apiKey": KEY}));
    }

    #[test]
    fn test_application_error_is_error_result() {
        let response = call(
            &handler(),
            json!(5),
            json!({"name": "base64-convert", "arguments": {"operation": "decode", "text": "!!!not-base64!!!"}}),
            Some(KEY),
        );
        assert!(response.error.is_none());
        let result = response.result.clone().unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(text_of(&response), "Invalid Base64 input");
    }

    #[test]
    fn test_handler_fault_is_internal_error() {
        let registry = ToolRegistry::builder()
            .register(ToolDefinition::new("fails", "Fails", "", json!({}), |_| {
                Err(ToolkitError::Internal("disk on fire".into()))
            }))
            .unwrap()
            .register(ToolDefinition::new("panics", "Panics", "", json!({}), |_| {
                panic!("boom")
            }))
            .unwrap()
            .build();
        let h = ToolkitHandler::new(registry, ApiKeyGate::new(KEY).unwrap());

        for name in ["fails", "panics"] {
            let response = call(&h, json!(name), json!({"name": name}), Some(KEY));
            assert_eq!(response.error_code(), Some(codes::INTERNAL_ERROR), "{}", name);
            assert_eq!(response.id, Some(json!(name)));
        }
    }

    #[test]
    fn test_missing_name_and_bad_arguments() {
        let response = call(&handler(), json!(1), json!({"arguments": {}}), Some(KEY));
        assert_eq!(response.error_code(), Some(codes::INVALID_PARAMS));
        assert_eq!(response.error.unwrap().message, "Missing tool name");

        let response = call(
            &handler(),
            json!(1),
            json!({"name": "generate-uuid", "arguments": [1]}),
            Some(KEY),
        );
        assert_eq!(response.error_code(), Some(codes::INVALID_PARAMS));
    }

    #[test]
    fn test_unknown_method_and_notifications() {
        let h = handler();
        let response = h
            .handle_request(
                McpRequest::new(Some(json!(9)), "resources/list", Value::Null),
                &RequestContext::local(),
            )
            .unwrap();
        assert_eq!(response.error_code(), Some(codes::METHOD_NOT_FOUND));
        assert_eq!(response.id, Some(json!(9)));

        let notification = McpRequest::new(None, methods::INITIALIZED, Value::Null);
        assert!(h.handle_request(notification, &RequestContext::local()).is_none());

        let unknown_no_id = McpRequest::new(None, "bogus", Value::Null);
        let response = h.handle_request(unknown_no_id, &RequestContext::local()).unwrap();
        assert!(response.id.is_none());
        assert_eq!(response.error_code(), Some(codes::METHOD_NOT_FOUND));
    }

    #[test]
    fn test_png_qr_includes_image_block() {
        let response = call(
            &handler(),
            json!(1),
            json!({"name": "generate-qr-code", "arguments": {"text": "hello"}}),
            Some(KEY),
        );
        let result: ToolCallResult = serde_json::from_value(response.result.unwrap()).unwrap();
        assert_eq!(result.content.len(), 2);
        assert!(matches!(
            &result.content[1],
            ToolContent::Image { mime_type, .. } if mime_type == "image/png"
        ));
    }
}
