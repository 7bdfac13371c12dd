use std::sync::Arc;

use clap::Parser;
use mcp_explorer::{api, client::McpClient, config::ExplorerConfig, logging};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("mcp_explorer=info,tower_http=info");

    let config = ExplorerConfig::parse();
    config.validate()?;

    let client = Arc::new(McpClient::over_http(
        Some(config.server_url.clone()),
        config.upstream_timeout(),
        config.client_options(),
    )?);
    let app = api::router(client);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, server_url = %config.server_url, "MCP Explorer listening");
    info!("open http://localhost:{} in a browser", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}
