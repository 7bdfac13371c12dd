use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::DecodedBlock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<PromptArgument>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptArgument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsListResult {
    #[serde(default)]
    pub prompts: Vec<Prompt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptsGetParams {
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptMessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptMessageRole,
    pub content: DecodedBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptsGetResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub messages: Vec<PromptMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ContentBlock;
    use serde_json::json;

    #[test]
    fn get_result_decodes_message_content() {
        let result: PromptsGetResult = serde_json::from_value(json!({
            "description": "Plan a trip",
            "messages": [
                {"role": "user", "content": {"type": "text", "text": "Plan 3 days in Paris"}}
            ]
        }))
        .unwrap();
        assert_eq!(result.messages[0].role, PromptMessageRole::User);
        assert_eq!(
            result.messages[0].content,
            DecodedBlock::Known(ContentBlock::Text { text: "Plan 3 days in Paris".to_string() })
        );
    }

    #[test]
    fn list_result_reads_argument_flags() {
        let result: PromptsListResult = serde_json::from_value(json!({
            "prompts": [{
                "name": "trip_planner",
                "arguments": [{"name": "city", "required": true}, {"name": "days"}]
            }]
        }))
        .unwrap();
        let args = result.prompts[0].arguments.as_ref().unwrap();
        assert_eq!(args[0].required, Some(true));
        assert_eq!(args[1].required, None);
    }
}
