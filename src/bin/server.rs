//! Productivity Toolkit MCP Server
//!
//! Run with: toolkit-server --api-key <KEY> [--mode stdio|http]

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use toolkit::auth::ApiKeyGate;
use toolkit::config::{
    LogFormat, ServerConfig, TransportMode, DEFAULT_HEARTBEAT_SECS, DEFAULT_HOST, DEFAULT_PORT,
};
use toolkit::error::Result;
use toolkit::http::{AppState, HealthState, HttpServer};
use toolkit::mcp::{builtin_registry, McpServer, ToolkitHandler};

#[derive(Parser, Debug)]
#[command(name = "toolkit-server")]
#[command(about = "Productivity Toolkit MCP server", version)]
struct Args {
    /// Shared API key required for tool calls
    #[arg(long, env = "MCP_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Transport (auto-detected from RENDER / NODE_ENV when omitted)
    #[arg(long, env = "TOOLKIT_MODE", value_enum)]
    mode: Option<TransportMode>,

    /// Bind host for HTTP mode (address or name)
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port for HTTP mode
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds between heartbeats on the GET /mcp event stream
    #[arg(long, env = "TOOLKIT_HEARTBEAT_SECS", default_value_t = DEFAULT_HEARTBEAT_SECS)]
    heartbeat_secs: u64,

    /// Log output format
    #[arg(long, env = "TOOLKIT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn init_logging(format: LogFormat) {
    // stderr only: stdout carries the stdio protocol
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn build(config: &ServerConfig) -> Result<ToolkitHandler> {
    let registry = builtin_registry()?;
    let gate = ApiKeyGate::new(config.api_key.clone())?;
    tracing::info!("Registered {} tools", registry.len());
    Ok(ToolkitHandler::new(registry, gate))
}

fn serve(config: ServerConfig, handler: ToolkitHandler) -> Result<()> {
    match config.mode {
        TransportMode::Stdio => {
            tracing::info!("Productivity Toolkit MCP server starting on stdio...");
            McpServer::new(handler).run()
        }
        TransportMode::Http => {
            let state = AppState::new(Arc::new(handler), Arc::new(HealthState::new()))
                .with_heartbeat(config.heartbeat);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(HttpServer::new(state, config.host, config.port).start())?;
            Ok(())
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.log_format);

    let mode = args.mode.unwrap_or_else(|| {
        TransportMode::detect(
            std::env::var("RENDER").ok().as_deref(),
            std::env::var("NODE_ENV").ok().as_deref(),
        )
    });

    let result = ServerConfig::resolve(
        args.api_key,
        mode,
        &args.host,
        args.port,
        args.heartbeat_secs,
    )
    .and_then(|config| {
        tracing::info!(mode = mode.as_str(), "Configuration loaded");
        let handler = build(&config)?;
        serve(config, handler)
    });

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
