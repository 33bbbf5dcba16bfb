//! HTTP transport: MCP over POST/GET/DELETE plus REST and health routes

pub mod health;
mod server;
mod sse;

pub use health::{HealthState, StreamGuard};
pub use server::{AppState, HttpServer};
pub use sse::{initialized_event, DEFAULT_HEARTBEAT};
