use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub(crate) fn handle_health(state: &AppState) -> Response {
    Json(json!({
        "message": "OpenAI compatible API server running",
        "model": state.config.upstream.model_name,
        "think_tags_mode": state.config.features.think_tags_mode.to_string(),
        "anonymous_token": state.config.upstream.anon_token_enabled,
    }))
    .into_response()
}
