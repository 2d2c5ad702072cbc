use serde::{Deserialize, Serialize};

use crate::util::{completion_id, unix_now_secs};

/// OpenAI Chat Completion request wire type.
///
/// Only the fields the proxy acts on are modeled; everything else is
/// captured in `extra` so unknown caller fields never fail decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
    /// Accepted from callers but not forwarded upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Accepted from callers but not forwarded upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A chat message, passed through to the upstream verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatMessage {
    #[must_use]
    pub fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(serde_json::Value::String(content.to_string())),
            extra: serde_json::Map::new(),
        }
    }
}

/// OpenAI Chat Completion response wire type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

/// A single choice in the aggregated response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: CompletionMessage,
    pub finish_reason: String,
}

/// Assistant message in the aggregated response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: String,
}

/// Token usage. The upstream provides no accounting, so every field is zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl ChatCompletion {
    /// Build a complete assistant response with a fixed `stop` finish reason.
    #[must_use]
    pub fn assistant(model: &str, content: String) -> Self {
        Self {
            id: completion_id(),
            object: "chat.completion".to_string(),
            created: unix_now_secs(),
            model: model.to_string(),
            choices: vec![Choice {
                index: 0,
                message: CompletionMessage {
                    role: "assistant".to_string(),
                    content,
                },
                finish_reason: "stop".to_string(),
            }],
            usage: Usage::default(),
        }
    }
}

/// A streaming chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

/// A choice within a stream chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    pub index: u32,
    pub delta: Delta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Delta content within a stream choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
}

impl ChatCompletionChunk {
    fn with_choice(model: &str, delta: Delta, finish_reason: Option<String>) -> Self {
        Self {
            id: completion_id(),
            object: "chat.completion.chunk".to_string(),
            created: unix_now_secs(),
            model: model.to_string(),
            choices: vec![StreamChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        }
    }

    /// The role-announcement chunk sent before any content.
    #[must_use]
    pub fn role(model: &str) -> Self {
        Self::with_choice(
            model,
            Delta {
                role: Some("assistant".to_string()),
                ..Delta::default()
            },
            None,
        )
    }

    /// A plain answer-content delta.
    #[must_use]
    pub fn content(model: &str, text: String) -> Self {
        Self::with_choice(
            model,
            Delta {
                content: Some(text),
                ..Delta::default()
            },
            None,
        )
    }

    /// A thinking-phase delta carried in `reasoning_content`.
    #[must_use]
    pub fn reasoning(model: &str, text: String) -> Self {
        Self::with_choice(
            model,
            Delta {
                reasoning_content: Some(text),
                ..Delta::default()
            },
            None,
        )
    }

    /// The finish-marker chunk: empty delta, `finish_reason: "stop"`.
    #[must_use]
    pub fn finish(model: &str) -> Self {
        Self::with_choice(model, Delta::default(), Some("stop".to_string()))
    }
}
