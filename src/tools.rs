use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resources::ResourceContents;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

impl Tool {
    /// Parameter names with their declared JSON types, required ones marked `*`.
    pub fn parameter_summary(&self) -> Vec<String> {
        let required: Vec<&str> = self
            .input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        self.input_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, prop)| {
                        let ty = prop.get("type").and_then(Value::as_str).unwrap_or("any");
                        let marker = if required.contains(&name.as_str()) { "*" } else { "" };
                        format!("{}{}: {}", name, marker, ty)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsListResult {
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsCallParams {
    pub name: String,
    pub arguments: Value,
}

/// MCP content block, shared by tool results and prompt messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Audio {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    ResourceLink {
        uri: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default, rename = "mimeType")]
        mime_type: Option<String>,
    },
    Resource {
        resource: ResourceContents,
    },
}

/// A content block as received. Blocks that do not match a known kind are
/// kept as raw JSON rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecodedBlock {
    Known(ContentBlock),
    Other(Value),
}

impl DecodedBlock {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedBlock::Known(ContentBlock::Text { text }) => Some(text),
            DecodedBlock::Known(ContentBlock::Resource { resource }) => resource.text.as_deref(),
            _ => None,
        }
    }

    /// One-line human rendering, used by the terminal client.
    pub fn describe(&self) -> String {
        match self {
            DecodedBlock::Known(ContentBlock::Text { text }) => text.clone(),
            DecodedBlock::Known(ContentBlock::Image { mime_type, data }) => {
                format!("[image {} ({} base64 chars)]", mime_type, data.len())
            }
            DecodedBlock::Known(ContentBlock::Audio { mime_type, data }) => {
                format!("[audio {} ({} base64 chars)]", mime_type, data.len())
            }
            DecodedBlock::Known(ContentBlock::ResourceLink { uri, .. }) => format!("[link {}]", uri),
            DecodedBlock::Known(ContentBlock::Resource { resource }) => match &resource.text {
                Some(text) => text.clone(),
                None => format!("[resource {}]", resource.uri),
            },
            DecodedBlock::Other(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<DecodedBlock>,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl CallToolResult {
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(DecodedBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
