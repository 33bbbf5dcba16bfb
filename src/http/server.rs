//! HTTP transport
//!
//! Serves the MCP dispatcher on `/mcp` (POST / GET / DELETE), the REST tool
//! routes on `/api/:tool`, and the health / info routes.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::health::{self, HealthState};
use super::sse::{self, DEFAULT_HEARTBEAT};
use crate::auth::{body_credential, header_credential, API_KEY_HEADER};
use crate::error::codes;
use crate::mcp::{
    decode_request, McpHandler, RequestContext, ToolkitHandler, UNAUTHORIZED_MESSAGE,
};

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<ToolkitHandler>,
    pub health: Arc<HealthState>,
    pub heartbeat: Duration,
}

impl AppState {
    pub fn new(handler: Arc<ToolkitHandler>, health: Arc<HealthState>) -> Self {
        Self {
            handler,
            health,
            heartbeat: DEFAULT_HEARTBEAT,
        }
    }

    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }
}

/// HTTP server
pub struct HttpServer {
    state: AppState,
    host: String,
    port: u16,
}

impl HttpServer {
    /// `host` may be an IP address or a name; names resolve at bind time.
    pub fn new(state: AppState, host: impl Into<String>, port: u16) -> Self {
        Self {
            state,
            host: host.into(),
            port,
        }
    }

    /// Open the listening socket
    pub async fn bind(&self) -> std::io::Result<tokio::net::TcpListener> {
        tokio::net::TcpListener::bind((self.host.as_str(), self.port)).await
    }

    /// Build the router
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route(
                "/mcp",
                post(mcp_post).get(sse::mcp_stream).delete(mcp_delete),
            )
            .route("/api/:tool", post(rest_tool))
            .route("/health", get(health::live))
            .route("/health/live", get(health::live))
            .route("/mcp/health", get(health::live))
            .route("/health/ready", get(health::ready))
            .route("/health/detailed", get(health::detailed))
            .route("/info", get(health::info))
            .fallback(not_found)
            .layer(cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind, mark the process ready, and serve until Ctrl-C
    pub async fn start(self) -> std::io::Result<()> {
        let listener = self.bind().await?;
        let health = self.state.health.clone();
        let app = Self::router(self.state);

        tracing::info!("HTTP server listening on {}", listener.local_addr()?);
        health.mark_ready();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(API_KEY_HEADER),
        ])
}

async fn root_handler() -> &'static str {
    "Productivity Toolkit MCP Server - REST API and MCP Protocol available. Check /health for endpoints."
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not Found"})))
}

/// `POST /mcp`: one envelope in, one envelope out
async fn mcp_post(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(response) => return (StatusCode::BAD_REQUEST, Json(response)).into_response(),
    };

    let context = RequestContext::with_header_credential(header_credential(&headers));
    match state.handler.handle_request(request, &context) {
        None => StatusCode::ACCEPTED.into_response(),
        Some(response) => {
            let status = if response.error_code() == Some(codes::UNAUTHORIZED) {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::OK
            };
            (status, Json(response)).into_response()
        }
    }
}

/// `DELETE /mcp`: no sessions exist, so there is nothing to tear down
async fn mcp_delete() -> Json<Value> {
    Json(json!({"status": "acknowledged"}))
}

/// `POST /api/:tool`: flat params in, raw record out
async fn rest_tool(
    State(state): State<AppState>,
    Path(tool): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(definition) = state.handler.registry().lookup(&tool) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Endpoint not found"})),
        )
            .into_response();
    };

    let params = serde_json::from_slice::<Value>(&body)
        .ok()
        .filter(Value::is_object)
        .unwrap_or_else(|| json!({}));

    let credential = header_credential(&headers).or_else(|| body_credential(&params));
    if !state.handler.gate().validate(credential.as_deref()) {
        tracing::warn!(tool = %tool, "Rejected REST call with invalid API key");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": UNAUTHORIZED_MESSAGE})),
        )
            .into_response();
    }

    match state.handler.invoke(definition, &params) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => {
            tracing::error!(tool = %tool, "REST tool call failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        }
    }
}
