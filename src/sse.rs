//! Decoding of upstream reply bodies.
//!
//! Streamable HTTP servers answer a POST either with a plain JSON body or
//! with a `text/event-stream` body carrying one event. Only the first `data:`
//! line is consulted; multi-event streams are not supported.

use serde_json::Value;

use crate::ExplorerError;

const DATA_FIELD: &str = "data:";

/// Returns the payload of the first SSE `data:` line, if the body has one.
pub fn first_data_line(body: &str) -> Option<&str> {
    body.lines().find_map(|line| {
        let line = line.strip_suffix('\r').unwrap_or(line);
        line.strip_prefix(DATA_FIELD)
            .map(|payload| payload.strip_prefix(' ').unwrap_or(payload))
    })
}

/// Decodes a reply body into JSON, whether it is SSE-framed or plain.
pub fn decode_body(status: u16, body: &str) -> Result<Value, ExplorerError> {
    let payload = first_data_line(body).unwrap_or(body);
    serde_json::from_str(payload).map_err(|e| ExplorerError::Decode {
        status,
        message: format!("{} (body: {})", e, preview(body)),
    })
}

fn preview(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    match trimmed.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
