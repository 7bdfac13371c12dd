pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod prompts;
pub mod resources;
pub mod session;
pub mod sse;
pub mod tools;
pub mod transport;

pub use error::ExplorerError;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonRpcBase {
    pub jsonrpc: String,
}

impl Default for JsonRpcBase {
    fn default() -> Self {
        JsonRpcBase { jsonrpc: JSONRPC_VERSION.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Hash, Eq)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(u64),
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        RequestId::Number(n)
    }
}

/// The upstream methods the explorer relays.
///
/// Each method is sent with a fixed request id. Only one request is ever in
/// flight per relayed call, so ids never need to be unique across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    Initialize,
    PromptsList,
    ToolsList,
    ResourcesList,
    ToolsCall,
    PromptsGet,
    ResourcesRead,
}

impl RpcMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcMethod::Initialize => "initialize",
            RpcMethod::PromptsList => "prompts/list",
            RpcMethod::ToolsList => "tools/list",
            RpcMethod::ResourcesList => "resources/list",
            RpcMethod::ToolsCall => "tools/call",
            RpcMethod::PromptsGet => "prompts/get",
            RpcMethod::ResourcesRead => "resources/read",
        }
    }

    pub fn request_id(&self) -> RequestId {
        let id = match self {
            RpcMethod::Initialize => 1,
            RpcMethod::PromptsList => 2,
            RpcMethod::ToolsList => 3,
            RpcMethod::ResourcesList => 4,
            RpcMethod::ToolsCall => 5,
            RpcMethod::PromptsGet => 6,
            RpcMethod::ResourcesRead => 7,
        };
        RequestId::Number(id)
    }
}

impl std::fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Request {
    #[serde(flatten)]
    pub protocol: JsonRpcBase,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Request {
    pub fn new<I: Into<RequestId>, P: Into<Option<Value>>>(id: I, method: &str, params: P) -> Self {
        Request {
            protocol: JsonRpcBase::default(),
            id: id.into(),
            method: method.to_string(),
            params: params.into(),
        }
    }

    pub fn for_method<P: Into<Option<Value>>>(method: RpcMethod, params: P) -> Self {
        Request::new(method.request_id(), method.as_str(), params)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(flatten)]
    pub base: JsonRpcBase,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Notification {
    pub fn new<P: Into<Option<Value>>>(method: &str, params: P) -> Self {
        Notification {
            base: JsonRpcBase::default(),
            method: method.to_string(),
            params: params.into(),
        }
    }

    pub fn initialized() -> Self {
        Notification::new("notifications/initialized", None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Typed view of an upstream reply. The relay itself forwards raw JSON and
/// only uses this to describe errors in logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

/// Outbound message. Requests expect a reply, notifications do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum McpMessage {
    Request(Request),
    Notification(Notification),
}

impl McpMessage {
    pub fn method(&self) -> &str {
        match self {
            McpMessage::Request(r) => &r.method,
            McpMessage::Notification(n) => &n.method,
        }
    }

    pub fn to_json(&self) -> Result<String, ExplorerError> {
        serde_json::to_string(self).map_err(ExplorerError::Serialization)
    }
}

impl From<Request> for McpMessage {
    fn from(request: Request) -> Self {
        McpMessage::Request(request)
    }
}

impl From<Notification> for McpMessage {
    fn from(notification: Notification) -> Self {
        McpMessage::Notification(notification)
    }
}

//--------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roots: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequestParams {
    pub protocol_version: String,
    pub capabilities: ClientCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<ClientInfo>,
}

impl Request {
    pub fn new_initialize(params: &InitializeRequestParams) -> Result<Self, ExplorerError> {
        let params = serde_json::to_value(params)?;
        Ok(Request::for_method(RpcMethod::Initialize, params))
    }
}
