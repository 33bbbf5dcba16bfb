//! MCP tool definitions for the toolkit

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use super::registry::{ToolDefinition, ToolRegistry};
use crate::error::{Result, ToolkitError};
use crate::generators;

/// All built-in tools: (name, title, description, input schema)
pub const TOOL_DEFINITIONS: &[(&str, &str, &str, &str)] = &[
    (
        "generate-password",
        "Password Generator",
        "Generate secure passwords with customizable options",
        r#"{
            "type": "object",
            "properties": {
                "apiKey": {"type": "string", "description": "API key (may instead be sent as a header)"},
                "length": {"type": "integer", "minimum": 8, "maximum": 128, "default": 16},
                "includeNumbers": {"type": "boolean", "default": true},
                "includeSymbols": {"type": "boolean", "default": true},
                "includeUppercase": {"type": "boolean", "default": true},
                "includeLowercase": {"type": "boolean", "default": true}
            }
        }"#,
    ),
    (
        "generate-qr-data",
        "QR Code Data Generator",
        "Generate formatted data for QR codes (WiFi, contact, URL, etc.)",
        r#"{
            "type": "object",
            "properties": {
                "apiKey": {"type": "string", "description": "API key (may instead be sent as a header)"},
                "type": {"type": "string", "enum": ["wifi", "contact", "url", "text"]},
                "data": {
                    "type": "object",
                    "properties": {
                        "ssid": {"type": "string"},
                        "password": {"type": "string"},
                        "security": {"type": "string", "enum": ["WPA", "WEP", "nopass"]},
                        "name": {"type": "string"},
                        "phone": {"type": "string"},
                        "email": {"type": "string"},
                        "content": {"type": "string"}
                    }
                }
            },
            "required": ["type", "data"]
        }"#,
    ),
    (
        "base64-convert",
        "Base64 Encoder/Decoder",
        "Encode or decode text using Base64",
        r#"{
            "type": "object",
            "properties": {
                "apiKey": {"type": "string", "description": "API key (may instead be sent as a header)"},
                "operation": {"type": "string", "enum": ["encode", "decode"]},
                "text": {"type": "string"}
            },
            "required": ["operation", "text"]
        }"#,
    ),
    (
        "generate-uuid",
        "UUID Generator",
        "Generate UUIDs (v4) for unique identifiers",
        r#"{
            "type": "object",
            "properties": {
                "apiKey": {"type": "string", "description": "API key (may instead be sent as a header)"},
                "count": {"type": "integer", "minimum": 1, "maximum": 10, "default": 1}
            }
        }"#,
    ),
    (
        "generate-color-palette",
        "Color Palette Generator",
        "Generate color palettes for design projects",
        r#"{
            "type": "object",
            "properties": {
                "apiKey": {"type": "string", "description": "API key (may instead be sent as a header)"},
                "baseColor": {"type": "string", "pattern": "^#[0-9A-Fa-f]{6}$"},
                "type": {"type": "string", "enum": ["monochromatic", "complementary", "triadic", "random"], "default": "random"},
                "count": {"type": "integer", "minimum": 3, "maximum": 10, "default": 5}
            }
        }"#,
    ),
    (
        "generate-qr-code",
        "QR Code Generator",
        "Generate QR codes from text strings",
        r#"{
            "type": "object",
            "properties": {
                "apiKey": {"type": "string", "description": "API key (may instead be sent as a header)"},
                "text": {"type": "string"},
                "format": {"type": "string", "enum": ["png", "svg", "terminal"], "default": "png"},
                "errorCorrectionLevel": {"type": "string", "enum": ["L", "M", "Q", "H"], "default": "M"},
                "width": {"type": "integer", "minimum": 100, "maximum": 1000, "default": 200}
            },
            "required": ["text"]
        }"#,
    ),
];

type ToolFn = fn(&Value) -> Result<Value>;

/// Build the registry holding every built-in tool, in declaration order
pub fn builtin_registry() -> Result<ToolRegistry> {
    let mut builder = ToolRegistry::builder();
    for (name, title, description, schema) in TOOL_DEFINITIONS {
        let handler = builtin_handler(name)
            .ok_or_else(|| ToolkitError::Config(format!("No handler for tool: {}", name)))?;
        let input_schema: Value = serde_json::from_str(schema)?;
        builder = builder.register(ToolDefinition::new(
            *name,
            *title,
            *description,
            input_schema,
            handler,
        ))?;
    }
    Ok(builder.build())
}

fn builtin_handler(name: &str) -> Option<ToolFn> {
    let handler: ToolFn = match name {
        "generate-password" => password_tool,
        "generate-qr-data" => qr_data_tool,
        "base64-convert" => base64_tool,
        "generate-uuid" => uuid_tool,
        "generate-color-palette" => palette_tool,
        "generate-qr-code" => qr_code_tool,
        _ => return None,
    };
    Some(handler)
}

fn password_tool(args: &Value) -> Result<Value> {
    run(args, generators::generate_password)
}

fn qr_data_tool(args: &Value) -> Result<Value> {
    run(args, generators::generate_qr_data)
}

fn base64_tool(args: &Value) -> Result<Value> {
    run(args, generators::convert_base64)
}

fn uuid_tool(args: &Value) -> Result<Value> {
    run(args, generators::generate_uuids)
}

fn palette_tool(args: &Value) -> Result<Value> {
    run(args, generators::generate_palette)
}

fn qr_code_tool(args: &Value) -> Result<Value> {
    run(args, generators::generate_qr_code)
}

/// Deserialize typed params, run the generator, and flatten application
/// errors into an `{"error": ...}` record. Other errors propagate as faults.
fn run<P, O>(args: &Value, generate: fn(&P) -> Result<O>) -> Result<Value>
where
    P: DeserializeOwned,
    O: Serialize,
{
    let params = match P::deserialize(args) {
        Ok(params) => params,
        Err(e) => return Ok(error_record(format!("Invalid parameters: {}", e))),
    };
    match generate(&params) {
        Ok(output) => Ok(serde_json::to_value(output)?),
        Err(e) if e.is_application() => Ok(error_record(e.to_string())),
        Err(e) => Err(e),
    }
}

/// Record shape for application-level failures
pub fn error_record(message: impl Into<String>) -> Value {
    json!({"error": message.into()})
}

/// The message of an `{"error": ...}` record, if `record` is one
pub fn record_error(record: &Value) -> Option<String> {
    record.get("error").map(|e| match e.as_str() {
        Some(s) => s.to_string(),
        None => e.to_string(),
    })
}
