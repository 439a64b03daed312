use serde::{Deserialize, Serialize};

/// A complete assistant turn as produced by the model backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantTurn {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: StopReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AssistantTurn {
    pub fn new(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            stop_reason: StopReason::Stop,
            error_message: None,
        }
    }

    pub fn with_stop_reason(mut self, stop_reason: StopReason) -> Self {
        self.stop_reason = stop_reason;
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// True if any text or thinking block carries non-blank content.
    pub fn has_visible_content(&self) -> bool {
        self.content.iter().any(ContentBlock::is_visible)
    }

    /// True if any block after `index` carries non-blank text or thinking.
    pub fn has_visible_after(&self, index: usize) -> bool {
        self.content
            .iter()
            .skip(index + 1)
            .any(ContentBlock::is_visible)
    }

    pub fn has_tool_calls(&self) -> bool {
        self.content.iter().any(ContentBlock::is_tool_call)
    }

    /// The error message, treating an empty string as absent.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref().filter(|msg| !msg.is_empty())
    }
}

/// Different types of blocks within an assistant turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
    },
    ToolCall(ToolCall),
    /// Any block type this renderer does not know about.
    #[serde(other)]
    Other,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn thinking(thinking: impl Into<String>) -> Self {
        ContentBlock::Thinking {
            thinking: thinking.into(),
        }
    }

    /// Trimmed text of a text or thinking block, `None` when blank.
    pub fn visible_text(&self) -> Option<&str> {
        let raw = match self {
            ContentBlock::Text { text } => text,
            ContentBlock::Thinking { thinking } => thinking,
            ContentBlock::ToolCall(_) | ContentBlock::Other => return None,
        };
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn is_visible(&self) -> bool {
        self.visible_text().is_some()
    }

    pub fn is_tool_call(&self) -> bool {
        matches!(self, ContentBlock::ToolCall(_))
    }
}

/// Tool invocation requested by the model. Rendered elsewhere; only its
/// presence matters here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: serde_json::Value::Null,
        }
    }
}

/// Why the model stopped producing this turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum StopReason {
    #[default]
    Stop,
    Length,
    ToolUse,
    Aborted,
    Error,
    Other(String),
}

impl From<&str> for StopReason {
    fn from(value: &str) -> Self {
        match value {
            "stop" | "normal" => StopReason::Stop,
            "length" => StopReason::Length,
            "toolUse" => StopReason::ToolUse,
            "aborted" => StopReason::Aborted,
            "error" => StopReason::Error,
            other => StopReason::Other(other.to_string()),
        }
    }
}

impl From<String> for StopReason {
    fn from(value: String) -> Self {
        StopReason::from(value.as_str())
    }
}

impl From<Option<String>> for StopReason {
    fn from(value: Option<String>) -> Self {
        value.map(StopReason::from).unwrap_or_default()
    }
}

impl From<StopReason> for String {
    fn from(value: StopReason) -> Self {
        match value {
            StopReason::Stop => "stop".to_string(),
            StopReason::Length => "length".to_string(),
            StopReason::ToolUse => "toolUse".to_string(),
            StopReason::Aborted => "aborted".to_string(),
            StopReason::Error => "error".to_string(),
            StopReason::Other(other) => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_turn_from_backend_json() {
        let json = r#"{
            "content": [
                {"type": "thinking", "thinking": "plan", "thinkingSignature": "sig"},
                {"type": "text", "text": "Hello"},
                {"type": "toolCall", "id": "call_1", "name": "bash", "arguments": {"command": "ls"}},
                {"type": "image", "data": "..."}
            ],
            "stopReason": "aborted",
            "errorMessage": "Connection reset",
            "usage": {"input": 10}
        }"#;

        let turn: AssistantTurn = serde_json::from_str(json).expect("parse turn");
        assert_eq!(turn.content.len(), 4);
        assert_eq!(turn.content[0], ContentBlock::thinking("plan"));
        assert_eq!(turn.content[1], ContentBlock::text("Hello"));
        assert!(turn.content[2].is_tool_call());
        assert_eq!(turn.content[3], ContentBlock::Other);
        assert_eq!(turn.stop_reason, StopReason::Aborted);
        assert_eq!(turn.error_message(), Some("Connection reset"));
    }

    #[test]
    fn test_missing_fields_default() {
        let turn: AssistantTurn = serde_json::from_str("{}").expect("parse empty turn");
        assert!(turn.content.is_empty());
        assert_eq!(turn.stop_reason, StopReason::Stop);
        assert_eq!(turn.error_message(), None);
    }

    #[test]
    fn test_null_stop_reason_means_stop() {
        let json = r#"{"content":[{"type":"text","text":"hi"}],"stopReason":null}"#;
        let turn: AssistantTurn = serde_json::from_str(json).expect("parse turn");
        assert_eq!(turn.stop_reason, StopReason::Stop);
        assert_eq!(turn.content, vec![ContentBlock::text("hi")]);
    }

    #[test]
    fn test_partial_tool_call_still_counts() {
        let json = r#"{
            "content": [{"type": "toolCall"}, {"type": "toolCall", "name": "bash"}],
            "stopReason": "error",
            "errorMessage": "boom"
        }"#;
        let turn: AssistantTurn = serde_json::from_str(json).expect("parse turn");
        assert!(turn.has_tool_calls());
        assert_eq!(turn.content[0], ContentBlock::ToolCall(ToolCall::new("", "")));
        assert_eq!(
            turn.content[1],
            ContentBlock::ToolCall(ToolCall::new("", "bash"))
        );
    }

    #[test]
    fn test_stop_reason_names() {
        assert_eq!(StopReason::from("normal"), StopReason::Stop);
        assert_eq!(StopReason::from("toolUse"), StopReason::ToolUse);
        assert_eq!(
            StopReason::from("refusal"),
            StopReason::Other("refusal".to_string())
        );
        assert_eq!(String::from(StopReason::Aborted), "aborted");
    }

    #[test]
    fn test_blank_blocks_are_not_visible() {
        assert!(!ContentBlock::text("   \n\t").is_visible());
        assert!(!ContentBlock::thinking("").is_visible());
        assert_eq!(ContentBlock::text("  hi \n").visible_text(), Some("hi"));
        assert!(!ContentBlock::ToolCall(ToolCall::new("1", "read")).is_visible());
    }

    #[test]
    fn test_visibility_scans() {
        let turn = AssistantTurn::new(vec![
            ContentBlock::text("a"),
            ContentBlock::thinking("  "),
            ContentBlock::ToolCall(ToolCall::new("1", "read")),
        ]);
        assert!(turn.has_visible_content());
        assert!(!turn.has_visible_after(0));
        assert!(turn.has_tool_calls());
    }

    #[test]
    fn test_empty_error_message_is_absent() {
        let turn = AssistantTurn::default()
            .with_stop_reason(StopReason::Error)
            .with_error_message("");
        assert_eq!(turn.error_message(), None);
    }
}
