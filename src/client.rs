use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    config::validate_server_url,
    prompts::{Prompt, PromptsGetParams, PromptsGetResult, PromptsListResult},
    resources::{Resource, ResourcesListResult, ResourcesReadParams, ResourcesReadResult},
    session::{ConnectionPhase, Session},
    sse,
    tools::{CallToolResult, Tool, ToolsCallParams, ToolsListResult},
    transport::{HttpTransport, McpTransport},
    ClientCapabilities, ClientInfo, ExplorerError, InitializeRequestParams, McpMessage, Notification, Request,
    Response, RpcMethod,
};

pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub protocol_version: String,
    pub client_info: ClientInfo,
    /// Refuse list/call/read/get until a connect has succeeded.
    pub require_connect: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            client_info: ClientInfo {
                name: "mcp-explorer".to_string(),
                title: None,
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
            require_connect: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOutcome {
    /// Absent when the server accepted the handshake without issuing a session.
    pub session_id: Option<String>,
    pub server_info: Option<Value>,
}

/// MCP client over streamable HTTP, holding the relay's single upstream session.
pub struct McpClient<T: McpTransport = HttpTransport> {
    session: Session,
    transport: T,
    options: ClientOptions,
}

impl McpClient<HttpTransport> {
    pub fn over_http(
        server_url: Option<String>,
        timeout: Duration,
        options: ClientOptions,
    ) -> Result<Self, ExplorerError> {
        Ok(McpClient::new(server_url, HttpTransport::new(timeout)?, options))
    }
}

impl<T: McpTransport> McpClient<T> {
    pub fn new(server_url: Option<String>, transport: T, options: ClientOptions) -> Self {
        McpClient { session: Session::new(server_url), transport, options }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs the `initialize` handshake, optionally against a new server URL.
    ///
    /// The stored session id is cleared before `initialize` is sent. Connects
    /// are serialized; a connect never interleaves with another one.
    pub async fn connect(&self, server_url: Option<String>) -> Result<ConnectOutcome, ExplorerError> {
        if let Some(url) = &server_url {
            validate_server_url(url)?;
        }
        let _gate = self.session.lock_connect().await;

        let endpoint = match server_url {
            Some(url) => url,
            None => self
                .session
                .current_server_url()
                .await
                .ok_or_else(|| ExplorerError::InvalidRequest("no MCP server URL configured".to_string()))?,
        };

        let attempt = self.session.begin_connect(Some(endpoint.clone())).await;
        let span = info_span!("connect", call_id = %Uuid::new_v4(), server_url = %endpoint, generation = attempt.generation);

        async {
            info!("connecting to MCP server");
            let outcome = self.handshake(&endpoint, attempt.generation).await;
            let phase = self.session.finish_connect(attempt.generation, outcome.is_ok()).await;
            match &outcome {
                Ok(connected) => info!(
                    session_id = connected.session_id.as_deref().unwrap_or("-"),
                    ?phase,
                    "connected"
                ),
                Err(e) => warn!(error = %e, ?phase, "connect failed"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn handshake(&self, endpoint: &str, generation: u64) -> Result<ConnectOutcome, ExplorerError> {
        let params = InitializeRequestParams {
            protocol_version: self.options.protocol_version.clone(),
            capabilities: ClientCapabilities::default(),
            client_info: Some(self.options.client_info.clone()),
        };
        let message = McpMessage::from(Request::new_initialize(&params)?);

        let reply = self.transport.post(endpoint, &message, None).await?;
        if let Some(id) = &reply.session_id {
            self.session.record_session_id(generation, id.clone()).await;
        }

        let body = sse::decode_body(reply.status, &reply.body)?;
        let result = into_result(RpcMethod::Initialize, body)?;
        debug!(protocol_version = ?result.get("protocolVersion"), "initialize accepted");

        self.notify_initialized(endpoint, reply.session_id.as_deref()).await;

        Ok(ConnectOutcome {
            session_id: reply.session_id,
            server_info: result.get("serverInfo").cloned(),
        })
    }

    // Best effort: servers that do not expect the notification are not penalized.
    async fn notify_initialized(&self, endpoint: &str, session_id: Option<&str>) {
        let message = McpMessage::from(Notification::initialized());
        match self.transport.post(endpoint, &message, session_id).await {
            Ok(reply) if reply.status >= 400 => {
                warn!(status = reply.status, "server rejected notifications/initialized")
            }
            Ok(_) => debug!("sent notifications/initialized"),
            Err(e) => warn!(error = %e, "failed to send notifications/initialized"),
        }
    }

    /// One JSON-RPC round trip. Returns the reply's `result` member untouched.
    pub async fn call(&self, method: RpcMethod, params: Option<Value>) -> Result<Value, ExplorerError> {
        let span = info_span!("rpc", call_id = %Uuid::new_v4(), method = %method);
        async {
            let snapshot = self.session.snapshot().await;
            if self.options.require_connect && snapshot.phase != ConnectionPhase::Connected {
                return Err(ExplorerError::NotConnected);
            }
            let endpoint = snapshot
                .server_url
                .as_deref()
                .ok_or_else(|| ExplorerError::InvalidRequest("no MCP server URL configured".to_string()))?;

            let message = McpMessage::from(Request::for_method(method, params));
            let reply = self
                .transport
                .post(endpoint, &message, snapshot.session_id.as_deref())
                .await
                .inspect_err(|e| warn!(error = %e, "upstream request failed"))?;

            if let Some(id) = reply.session_id {
                if snapshot.session_id.as_deref() != Some(id.as_str()) {
                    self.session.record_session_id(snapshot.generation, id).await;
                }
            }

            let body = sse::decode_body(reply.status, &reply.body)?;
            into_result(method, body)
        }
        .instrument(span)
        .await
    }

    pub async fn list_prompts(&self) -> Result<Value, ExplorerError> {
        self.call(RpcMethod::PromptsList, None).await
    }

    pub async fn list_tools(&self) -> Result<Value, ExplorerError> {
        self.call(RpcMethod::ToolsList, None).await
    }

    pub async fn list_resources(&self) -> Result<Value, ExplorerError> {
        self.call(RpcMethod::ResourcesList, None).await
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, ExplorerError> {
        let params = ToolsCallParams { name: name.to_string(), arguments };
        self.call(RpcMethod::ToolsCall, Some(serde_json::to_value(params)?)).await
    }

    pub async fn get_prompt(&self, name: &str, arguments: Value) -> Result<Value, ExplorerError> {
        let params = PromptsGetParams { name: name.to_string(), arguments };
        self.call(RpcMethod::PromptsGet, Some(serde_json::to_value(params)?)).await
    }

    pub async fn read_resource(&self, uri: &str) -> Result<Value, ExplorerError> {
        let params = ResourcesReadParams { uri: uri.to_string() };
        self.call(RpcMethod::ResourcesRead, Some(serde_json::to_value(params)?)).await
    }

    pub async fn tools(&self) -> Result<Vec<Tool>, ExplorerError> {
        let result: ToolsListResult = serde_json::from_value(self.list_tools().await?)?;
        Ok(result.tools)
    }

    pub async fn resources(&self) -> Result<Vec<Resource>, ExplorerError> {
        let result: ResourcesListResult = serde_json::from_value(self.list_resources().await?)?;
        Ok(result.resources)
    }

    pub async fn prompts(&self) -> Result<Vec<Prompt>, ExplorerError> {
        let result: PromptsListResult = serde_json::from_value(self.list_prompts().await?)?;
        Ok(result.prompts)
    }

    pub async fn call_tool_typed(&self, name: &str, arguments: Value) -> Result<CallToolResult, ExplorerError> {
        Ok(serde_json::from_value(self.call_tool(name, arguments).await?)?)
    }

    pub async fn get_prompt_typed(&self, name: &str, arguments: Value) -> Result<PromptsGetResult, ExplorerError> {
        Ok(serde_json::from_value(self.get_prompt(name, arguments).await?)?)
    }

    pub async fn read_resource_typed(&self, uri: &str) -> Result<ResourcesReadResult, ExplorerError> {
        Ok(serde_json::from_value(self.read_resource(uri).await?)?)
    }
}

/// Splits a decoded reply into its `result`, or the error the caller reports.
/// An `error` member always wins, so an error reply can never look successful.
fn into_result(method: RpcMethod, body: Value) -> Result<Value, ExplorerError> {
    let Value::Object(mut map) = body else {
        return Err(ExplorerError::MissingResult(body));
    };

    if map.get("error").is_some_and(|e| !e.is_null()) {
        let body = Value::Object(map);
        if let Ok(Response { error: Some(error), .. }) = serde_json::from_value::<Response>(body.clone()) {
            warn!(%method, code = error.code, message = %error.message, "upstream returned a JSON-RPC error");
        }
        return Err(ExplorerError::Rpc(body));
    }

    match map.remove("result") {
        Some(result) => Ok(result),
        None => Err(ExplorerError::MissingResult(Value::Object(map))),
    }
}
