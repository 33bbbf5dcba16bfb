//! Startup configuration
//!
//! The binary parses flags and environment variables with clap; this module
//! turns the raw values into a validated [`ServerConfig`].

use std::time::Duration;

use clap::ValueEnum;

use crate::error::{Result, ToolkitError};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Which transport the process serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportMode {
    /// Line-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// MCP, REST and health routes over HTTP
    Http,
}

impl TransportMode {
    /// Pick a mode from the hosting environment: a `RENDER` marker or
    /// `NODE_ENV=production` means a hosted deployment.
    pub fn detect(render: Option<&str>, node_env: Option<&str>) -> Self {
        if render.is_some() || node_env == Some("production") {
            TransportMode::Http
        } else {
            TransportMode::Stdio
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Stdio => "stdio",
            TransportMode::Http => "http",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Validated server configuration
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub api_key: String,
    pub mode: TransportMode,
    /// Bind host: an IP address or a name resolved when the listener binds
    pub host: String,
    pub port: u16,
    pub heartbeat: Duration,
}

impl ServerConfig {
    /// Validate raw settings. A missing or empty API key is fatal.
    pub fn resolve(
        api_key: Option<String>,
        mode: TransportMode,
        host: &str,
        port: u16,
        heartbeat_secs: u64,
    ) -> Result<Self> {
        let api_key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
            ToolkitError::Config("MCP_API_KEY environment variable is required".to_string())
        })?;

        let host = match host.trim() {
            "" => DEFAULT_HOST,
            host => host,
        };

        if heartbeat_secs == 0 {
            return Err(ToolkitError::Config(
                "Heartbeat interval must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            mode,
            host: host.to_string(),
            port,
            heartbeat: Duration::from_secs(heartbeat_secs),
        })
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("api_key", &"<redacted>")
            .field("mode", &self.mode)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("heartbeat", &self.heartbeat)
            .finish()
    }
}
