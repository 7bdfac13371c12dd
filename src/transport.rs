use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{header::{ACCEPT, CONTENT_TYPE}, Client};
use tracing::debug;

use crate::{ExplorerError, McpMessage};

/// Header carrying the upstream session id. Header names are case-insensitive,
/// so this also matches servers that spell it `MCP-Session-ID`.
pub const MCP_SESSION_ID: &str = "mcp-session-id";

pub const ACCEPT_VALUE: &str = "text/event-stream, application/json";

/// Raw outcome of one POST to the upstream server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub session_id: Option<String>,
    pub body: String,
}

/// One HTTP round trip to an MCP endpoint.
pub trait McpTransport: Send + Sync + 'static {
    fn post<'a>(
        &'a self,
        endpoint: &'a str,
        message: &'a McpMessage,
        session_id: Option<&'a str>,
    ) -> BoxFuture<'a, Result<UpstreamReply, ExplorerError>>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ExplorerError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpTransport { client })
    }

    async fn send(
        &self,
        endpoint: &str,
        message: &McpMessage,
        session_id: Option<&str>,
    ) -> Result<UpstreamReply, ExplorerError> {
        let body = message.to_json()?;
        let mut request = self
            .client
            .post(endpoint)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(id) = session_id {
            request = request.header(MCP_SESSION_ID, id);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let session_id = response
            .headers()
            .get(MCP_SESSION_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        // Notifications carry no reply; a server may hold their stream open.
        let body = match message {
            McpMessage::Notification(_) => String::new(),
            McpMessage::Request(_) => response.text().await?,
        };

        debug!(
            endpoint,
            method = message.method(),
            status,
            session_id = session_id.as_deref().unwrap_or("-"),
            bytes = body.len(),
            "upstream replied"
        );

        Ok(UpstreamReply { status, session_id, body })
    }
}

impl McpTransport for HttpTransport {
    fn post<'a>(
        &'a self,
        endpoint: &'a str,
        message: &'a McpMessage,
        session_id: Option<&'a str>,
    ) -> BoxFuture<'a, Result<UpstreamReply, ExplorerError>> {
        Box::pin(self.send(endpoint, message, session_id))
    }
}
