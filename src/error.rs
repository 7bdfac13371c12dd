use axum::{response::{IntoResponse, Response as AxumResponse}, Json};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("Json serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Upstream returned an undecodable body (HTTP {status}): {message}")]
    Decode {
        status: u16,
        message: String,
    },
    /// The upstream answered with a JSON-RPC `error` member. Holds the whole response.
    #[error("{}", render(.0))]
    Rpc(Value),
    /// The upstream answered with JSON that has neither `result` nor `error`.
    #[error("{}", render(.0))]
    MissingResult(Value),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Not connected: call /api/connect first")]
    NotConnected,
    #[error("Configuration error: {0}")]
    Config(String),
}

fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

impl ExplorerError {
    /// Stable machine-readable category, reported to the UI as `errorKind`.
    pub fn kind(&self) -> &'static str {
        match self {
            ExplorerError::Transport(_) => "transport",
            ExplorerError::Decode { .. } | ExplorerError::Serialization(_) => "decode",
            ExplorerError::Rpc(_) => "rpc",
            ExplorerError::MissingResult(_) => "missing_result",
            ExplorerError::InvalidRequest(_) | ExplorerError::Config(_) => "invalid_request",
            ExplorerError::NotConnected => "not_connected",
        }
    }

    pub fn envelope(&self) -> Value {
        json!({
            "success": false,
            "error": self.to_string(),
            "errorKind": self.kind(),
        })
    }
}

// Failures are reported in-band; the UI always reads the JSON body.
impl IntoResponse for ExplorerError {
    fn into_response(self) -> AxumResponse {
        Json(self.envelope()).into_response()
    }
}
