use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::UpstreamConfig;
use crate::protocol::openai::ChatMessage;
use crate::util::{rfc3339_now, session_ids};

/// Request body for the upstream chat endpoint.
///
/// The upstream only serves the web frontend, so the body mirrors what the
/// browser sends: a synthetic conversation id, the frontend's feature flags,
/// and template variables the frontend would normally fill in.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamChatRequest {
    pub stream: bool,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub params: Value,
    pub features: Value,
    pub background_tasks: Value,
    pub chat_id: String,
    pub id: String,
    pub mcp_servers: Vec<Value>,
    pub model_item: Value,
    pub tool_servers: Vec<Value>,
    pub variables: Value,
}

impl UpstreamChatRequest {
    /// Build the upstream body for one conversation.
    ///
    /// The upstream is always asked for a stream; the proxy aggregates when
    /// the caller wants a non-streaming response.
    #[must_use]
    pub fn new(upstream: &UpstreamConfig, messages: Vec<ChatMessage>) -> Self {
        let (chat_id, msg_id) = session_ids();
        Self {
            stream: true,
            model: upstream.model_id.clone(),
            messages,
            params: json!({}),
            features: json!({ "enable_thinking": true }),
            background_tasks: json!({
                "title_generation": false,
                "tags_generation": false,
            }),
            chat_id,
            id: msg_id,
            mcp_servers: Vec::new(),
            model_item: json!({
                "id": upstream.model_id,
                "name": upstream.model_name,
                "owned_by": "openai",
            }),
            tool_servers: Vec::new(),
            variables: json!({
                "{{USER_NAME}}": "User",
                "{{USER_LOCATION}}": "Unknown",
                "{{CURRENT_DATETIME}}": rfc3339_now(),
            }),
        }
    }
}

/// One decoded upstream SSE event, before interpretation.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UpstreamEventFrame {
    #[serde(default)]
    pub error: Option<UpstreamErrorBody>,
    #[serde(default)]
    pub data: Option<UpstreamEventData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UpstreamEventData {
    #[serde(default)]
    pub delta_content: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default)]
    pub error: Option<UpstreamErrorBody>,
    #[serde(default)]
    pub inner: Option<UpstreamInner>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UpstreamInner {
    #[serde(default)]
    pub error: Option<UpstreamErrorBody>,
}

/// Error payload the upstream nests at several depths.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UpstreamErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Response body of the anonymous-token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthsResponse {
    pub token: Option<String>,
}
