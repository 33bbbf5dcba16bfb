//! Process health state and the health / info routes
//!
//! These routes only read [`HealthState`] and the registry's tool names;
//! they never consult the API key gate or run a tool.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use super::server::AppState;
use crate::mcp::SERVER_NAME;

/// Process-wide health snapshot, created once at startup
#[derive(Debug)]
pub struct HealthState {
    started_at: DateTime<Utc>,
    started: Instant,
    ready: AtomicBool,
    version: &'static str,
    active_streams: AtomicUsize,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
            ready: AtomicBool::new(false),
            version: env!("CARGO_PKG_VERSION"),
            active_streams: AtomicUsize::new(0),
        }
    }

    /// Flip to ready. There is no way back.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    /// Number of open server-push streams
    pub fn active_streams(&self) -> usize {
        self.active_streams.load(Ordering::SeqCst)
    }

    /// Count a push stream as open until the returned guard is dropped
    pub fn stream_guard(self: &Arc<Self>) -> StreamGuard {
        let open = self.active_streams.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(open, "Push stream opened");
        StreamGuard {
            health: Arc::clone(self),
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Held by a push stream for as long as it lives
#[derive(Debug)]
pub struct StreamGuard {
    health: Arc<HealthState>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        let open = self.health.active_streams.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::debug!(open, "Push stream closed, heartbeat cancelled");
    }
}

/// `GET /health`, `/health/live`, `/mcp/health`
pub async fn live(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime": state.health.uptime_secs(),
    }))
}

/// `GET /health/ready`
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.health.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "ready": ready,
            "checks": {
                "apiKeyConfigured": true,
                "toolsRegistered": state.handler.registry().len(),
            },
        })),
    )
}

/// `GET /health/detailed`
pub async fn detailed(State(state): State<AppState>) -> Json<Value> {
    let health = &state.health;
    Json(json!({
        "status": if health.is_ready() { "healthy" } else { "starting" },
        "ready": health.is_ready(),
        "server": SERVER_NAME,
        "version": health.version(),
        "startedAt": health.started_at().to_rfc3339(),
        "uptime": health.uptime_secs(),
        "pid": std::process::id(),
        "transport": "http",
        "activeStreams": health.active_streams(),
        "heartbeatSeconds": state.heartbeat.as_secs_f64(),
        "tools": state.handler.registry().names(),
    }))
}

/// `GET /info`
pub async fn info(State(state): State<AppState>) -> Json<Value> {
    let registry = state.handler.registry();
    let mut endpoints = Map::new();
    for tool in registry.list() {
        endpoints.insert(
            format!("POST /api/{}", tool.name),
            Value::String(tool.description),
        );
    }
    for (route, description) in [
        ("POST /mcp", "MCP JSON-RPC requests"),
        ("GET /mcp", "MCP server-push event stream"),
        ("DELETE /mcp", "MCP session teardown (no-op)"),
        ("GET /health", "Liveness"),
        ("GET /health/ready", "Readiness"),
        ("GET /health/detailed", "Diagnostics"),
    ] {
        endpoints.insert(route.to_string(), Value::String(description.to_string()));
    }

    Json(json!({
        "name": SERVER_NAME,
        "version": state.health.version(),
        "description": "Password, UUID, QR code, color palette and Base64 utilities over MCP and REST",
        "protocolVersion": crate::mcp::PROTOCOL_VERSION,
        "tools": registry.names(),
        "endpoints": endpoints,
        "authentication": "API key required via X-API-Key header, Authorization header, or apiKey in request body",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_is_one_way() {
        let health = HealthState::new();
        assert!(!health.is_ready());
        health.mark_ready();
        health.mark_ready();
        assert!(health.is_ready());
    }

    #[test]
    fn test_stream_guard_counts() {
        let health = Arc::new(HealthState::new());
        let first = health.stream_guard();
        let second = health.stream_guard();
        assert_eq!(health.active_streams(), 2);
        drop(first);
        assert_eq!(health.active_streams(), 1);
        drop(second);
        assert_eq!(health.active_streams(), 0);
    }
}
