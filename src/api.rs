//! HTTP facade: the REST-ish endpoints the browser UI drives.
//!
//! Every `/api/*` handler maps to one upstream JSON-RPC call and answers with
//! a JSON envelope, `{success: true, ...}` or `{success: false, error, errorKind}`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::{client::McpClient, transport::McpTransport, ExplorerError};

const INDEX_HTML: &str = include_str!("ui/index.html");

type ApiResult = Result<Json<Value>, ExplorerError>;

pub fn router<T: McpTransport>(client: Arc<McpClient<T>>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/server-url", get(server_url::<T>))
        .route("/api/connect", post(connect::<T>))
        .route("/api/prompts/list", get(list_prompts::<T>))
        .route("/api/tools/list", get(list_tools::<T>))
        .route("/api/resources/list", get(list_resources::<T>))
        .route("/api/tools/call", post(call_tool::<T>))
        .route("/api/prompts/get", post(get_prompt::<T>))
        .route("/api/resources/read", post(read_resource::<T>))
        .layer(TraceLayer::new_for_http())
        .with_state(client)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectBody {
    #[serde(default)]
    server_url: Option<String>,
}

/// Body of `tools/call` and `prompts/get`.
#[derive(Debug, Deserialize)]
struct NamedCall {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ReadBody {
    uri: String,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ExplorerError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| ExplorerError::InvalidRequest(rejection.body_text()))
}

/// `result.<key>`, or an empty list when the server left it out.
fn list_field(result: &Value, key: &str) -> Value {
    result
        .get(key)
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or_else(|| json!([]))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn server_url<T: McpTransport>(State(client): State<Arc<McpClient<T>>>) -> Json<Value> {
    Json(json!({ "serverUrl": client.session().current_server_url().await }))
}

async fn connect<T: McpTransport>(
    State(client): State<Arc<McpClient<T>>>,
    payload: Result<Json<ConnectBody>, JsonRejection>,
) -> ApiResult {
    let requested = body(payload)?
        .server_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());

    let outcome = client.connect(requested).await?;
    Ok(Json(json!({
        "success": true,
        "sessionId": outcome.session_id.unwrap_or_else(|| "active".to_string()),
    })))
}

async fn list_prompts<T: McpTransport>(State(client): State<Arc<McpClient<T>>>) -> ApiResult {
    let result = client.list_prompts().await?;
    Ok(Json(json!({ "success": true, "prompts": list_field(&result, "prompts") })))
}

async fn list_tools<T: McpTransport>(State(client): State<Arc<McpClient<T>>>) -> ApiResult {
    let result = client.list_tools().await?;
    Ok(Json(json!({ "success": true, "tools": list_field(&result, "tools") })))
}

async fn list_resources<T: McpTransport>(State(client): State<Arc<McpClient<T>>>) -> ApiResult {
    let result = client.list_resources().await?;
    Ok(Json(json!({ "success": true, "resources": list_field(&result, "resources") })))
}

async fn call_tool<T: McpTransport>(
    State(client): State<Arc<McpClient<T>>>,
    payload: Result<Json<NamedCall>, JsonRejection>,
) -> ApiResult {
    let call = body(payload)?;
    let result = client
        .call_tool(&call.name, call.arguments.unwrap_or_else(|| json!({})))
        .await?;
    Ok(Json(json!({ "success": true, "result": result })))
}

async fn get_prompt<T: McpTransport>(
    State(client): State<Arc<McpClient<T>>>,
    payload: Result<Json<NamedCall>, JsonRejection>,
) -> ApiResult {
    let call = body(payload)?;
    let result = client
        .get_prompt(&call.name, call.arguments.unwrap_or_else(|| json!({})))
        .await?;
    Ok(Json(json!({ "success": true, "result": result })))
}

async fn read_resource<T: McpTransport>(
    State(client): State<Arc<McpClient<T>>>,
    payload: Result<Json<ReadBody>, JsonRejection>,
) -> ApiResult {
    let read = body(payload)?;
    let result = client.read_resource(&read.uri).await?;
    Ok(Json(json!({ "success": true, "result": result })))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        client::ClientOptions,
        transport::{
            testing::{json_reply, sse_reply, StubTransport},
            UpstreamReply,
        },
    };

    fn explorer(transport: StubTransport) -> (Router, Arc<McpClient<StubTransport>>) {
        let client = Arc::new(McpClient::new(
            Some("http://upstream/mcp".to_string()),
            transport,
            ClientOptions::default(),
        ));
        (router(client.clone()), client)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if body.is_some() {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        let request = request
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn echo_result(result: Value) -> StubTransport {
        StubTransport::new(move |sent| {
            Ok(sse_reply(json!({"jsonrpc": "2.0", "id": sent.message["id"], "result": result})))
        })
    }

    #[tokio::test]
    async fn index_serves_the_ui() {
        let (app, _) = explorer(echo_result(json!({})));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("MCP Explorer"));
        assert!(html.contains("/api/tools/call"));
    }

    #[test]
    fn every_ui_api_call_handles_network_failure() {
        let calls: Vec<usize> = INDEX_HTML.match_indices("await api(").map(|(at, _)| at).collect();
        assert!(calls.len() >= 6);
        for (n, &at) in calls.iter().enumerate() {
            let before = &INDEX_HTML[..at];
            let open_try = before.rfind("try {").expect("api call outside any try block");
            assert!(
                !before[open_try..].contains("catch ("),
                "api call at byte {} is not inside an open try block",
                at
            );
            let next_call = calls.get(n + 1).copied().unwrap_or(INDEX_HTML.len());
            assert!(
                INDEX_HTML[at..next_call].contains("catch ("),
                "api call at byte {} has no catch",
                at
            );
        }
    }

    #[tokio::test]
    async fn server_url_reports_the_configured_upstream() {
        let (app, _) = explorer(echo_result(json!({})));
        let (_, body) = send(&app, "GET", "/api/server-url", None).await;
        assert_eq!(body, json!({"serverUrl": "http://upstream/mcp"}));
    }

    #[tokio::test]
    async fn connect_reports_session_or_active() {
        let (app, _) = explorer(StubTransport::new(|sent| {
            if sent.method == "initialize" {
                Ok(UpstreamReply { session_id: Some("abc123".to_string()), ..json_reply(json!({"result": {}})) })
            } else {
                Ok(UpstreamReply { status: 202, session_id: None, body: String::new() })
            }
        }));
        let (status, body) = send(&app, "POST", "/api/connect", Some(r#"{"serverUrl": "http://other/mcp"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "sessionId": "abc123"}));

        let (_, body) = send(&app, "GET", "/api/server-url", None).await;
        assert_eq!(body["serverUrl"], "http://other/mcp");

        let (app, _) = explorer(echo_result(json!({"protocolVersion": "2024-11-05"})));
        let (_, body) = send(&app, "POST", "/api/connect", Some(r#"{"serverUrl": ""}"#)).await;
        assert_eq!(body, json!({"success": true, "sessionId": "active"}));
    }

    #[tokio::test]
    async fn list_endpoints_extract_their_payload() {
        let (app, _) = explorer(echo_result(json!({
            "tools": [{"name": "mul", "inputSchema": {"type": "object"}}],
            "prompts": [{"name": "trip_planner"}]
        })));

        let (_, tools) = send(&app, "GET", "/api/tools/list", None).await;
        assert_eq!(tools, json!({"success": true, "tools": [{"name": "mul", "inputSchema": {"type": "object"}}]}));

        let (_, prompts) = send(&app, "GET", "/api/prompts/list", None).await;
        assert_eq!(prompts["prompts"][0]["name"], "trip_planner");

        // Missing list key degrades to an empty list.
        let (_, resources) = send(&app, "GET", "/api/resources/list", None).await;
        assert_eq!(resources, json!({"success": true, "resources": []}));
    }

    #[tokio::test]
    async fn tool_call_result_is_returned_verbatim() {
        let (app, client) = explorer(echo_result(json!({"content": [{"text": "96"}]})));
        let (_, body) = send(
            &app,
            "POST",
            "/api/tools/call",
            Some(r#"{"name": "mul", "arguments": {"a": 12, "b": 8}}"#),
        )
        .await;
        assert_eq!(body, json!({"success": true, "result": {"content": [{"text": "96"}]}}));
        assert_eq!(client.transport().sent()[0].message["params"]["arguments"], json!({"a": 12, "b": 8}));
    }

    #[tokio::test]
    async fn prompt_arguments_default_to_empty_object() {
        let (app, client) = explorer(echo_result(json!({"messages": []})));
        let (_, body) = send(&app, "POST", "/api/prompts/get", Some(r#"{"name": "trip_planner"}"#)).await;
        assert_eq!(body, json!({"success": true, "result": {"messages": []}}));
        assert_eq!(
            client.transport().sent()[0].message["params"],
            json!({"name": "trip_planner", "arguments": {}})
        );
    }

    #[tokio::test]
    async fn upstream_error_becomes_failure_envelope() {
        let upstream_error = json!({"jsonrpc": "2.0", "id": 7, "error": {"code": -32002, "message": "Resource not found"}});
        let reply = upstream_error.clone();
        let (app, _) = explorer(StubTransport::new(move |_| Ok(json_reply(reply.clone()))));

        let (status, body) = send(&app, "POST", "/api/resources/read", Some(r#"{"uri": "resource://missing"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["errorKind"], "rpc");
        let echoed: Value = serde_json::from_str(body["error"].as_str().unwrap()).unwrap();
        assert_eq!(echoed, upstream_error);
    }

    #[tokio::test]
    async fn malformed_bodies_are_invalid_requests() {
        let (app, client) = explorer(echo_result(json!({})));

        let (status, body) = send(&app, "POST", "/api/tools/call", Some("{not json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["errorKind"], "invalid_request");

        let (_, body) = send(&app, "POST", "/api/resources/read", Some(r#"{"url": "typo"}"#)).await;
        assert_eq!(body["errorKind"], "invalid_request");

        let (_, body) = send(&app, "POST", "/api/connect", None).await;
        assert_eq!(body["errorKind"], "invalid_request");

        assert!(client.transport().sent().is_empty());
    }
}
