use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::state::AppState;
use crate::util::unix_now_secs;

/// `GET /v1/models`: the single advertised model, no authentication.
pub(crate) fn handle_models(state: &AppState) -> Response {
    Json(json!({
        "object": "list",
        "data": [{
            "id": state.config.upstream.model_name,
            "object": "model",
            "created": unix_now_secs(),
            "owned_by": "z.ai",
        }],
    }))
    .into_response()
}
