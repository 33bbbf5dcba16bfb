//! Productivity Toolkit - MCP tool server
//!
//! Password, UUID, QR code, color palette and Base64 generators exposed as
//! MCP tools over stdio or HTTP, plus a REST surface and health routes.

pub mod auth;
pub mod config;
pub mod error;
pub mod generators;
pub mod http;
pub mod mcp;

pub use error::{Result, ToolkitError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
