//! Command-line and environment configuration.

use std::{net::{IpAddr, SocketAddr}, time::Duration};

use clap::Parser;
use url::Url;

use crate::{client::{ClientOptions, DEFAULT_PROTOCOL_VERSION}, ExplorerError};

/// Relay settings for the `mcp_explorer` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "mcp_explorer")]
#[command(about = "Interactive web explorer for MCP servers")]
#[command(after_help = "Example: mcp_explorer http://localhost:8000/mcp 5000")]
#[command(version)]
pub struct ExplorerConfig {
    /// MCP server endpoint used until the UI connects elsewhere
    pub server_url: String,

    /// Port for the explorer UI and API
    #[arg(default_value_t = 5000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "MCP_EXPLORER_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Timeout for each upstream request, in seconds
    #[arg(long, env = "MCP_EXPLORER_UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout_secs: u64,

    /// Refuse list/call/read/get requests until a connect has succeeded
    #[arg(long, env = "MCP_EXPLORER_REQUIRE_CONNECT")]
    pub require_connect: bool,

    /// Protocol version offered in `initialize`
    #[arg(long, default_value = DEFAULT_PROTOCOL_VERSION)]
    pub protocol_version: String,
}

impl ExplorerConfig {
    pub fn validate(&self) -> Result<(), ExplorerError> {
        validate_server_url(&self.server_url)?;
        validate_timeout(self.upstream_timeout_secs)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            protocol_version: self.protocol_version.clone(),
            require_connect: self.require_connect,
            ..ClientOptions::default()
        }
    }
}

/// Settings for the `mcp_discover` terminal client.
#[derive(Parser, Debug, Clone)]
#[command(name = "mcp_discover")]
#[command(about = "List the tools, resources and prompts of an MCP server")]
#[command(version)]
pub struct DiscoverArgs {
    /// MCP server endpoint, e.g. http://127.0.0.1:8000/mcp
    pub server_url: String,

    /// Call this tool after listing
    #[arg(long)]
    pub call: Option<String>,

    /// JSON object passed as arguments to --call and --prompt
    #[arg(long, default_value = "{}")]
    pub arguments: String,

    /// Read this resource URI after listing
    #[arg(long)]
    pub read: Option<String>,

    /// Render this prompt after listing
    #[arg(long)]
    pub prompt: Option<String>,

    /// Timeout for each request, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl DiscoverArgs {
    pub fn validate(&self) -> Result<(), ExplorerError> {
        validate_server_url(&self.server_url)?;
        validate_timeout(self.timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn validate_timeout(secs: u64) -> Result<(), ExplorerError> {
    if secs == 0 {
        return Err(ExplorerError::Config("timeout must be at least 1 second".to_string()));
    }
    Ok(())
}

/// Accepts absolute http(s) URLs only.
pub fn validate_server_url(raw: &str) -> Result<Url, ExplorerError> {
    let url = Url::parse(raw)
        .map_err(|e| ExplorerError::InvalidRequest(format!("invalid MCP server URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ExplorerError::InvalidRequest(format!(
            "unsupported scheme '{}' in MCP server URL '{}'",
            other, raw
        ))),
    }
}
