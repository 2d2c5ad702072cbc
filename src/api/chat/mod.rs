pub mod non_streaming;
pub mod streaming;

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::{HeaderMap, StatusCode};

use crate::error::ProxyError;
use crate::protocol::openai::ChatCompletionRequest;
use crate::protocol::upstream::UpstreamChatRequest;
use crate::state::AppState;

pub(crate) async fn handle_chat_completions(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Response {
    match chat_completions(state, headers, body).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

async fn chat_completions(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, ProxyError> {
    state.authenticate(headers)?;

    let request: ChatCompletionRequest = serde_json::from_slice(body)
        .map_err(|err| ProxyError::InvalidRequest(format!("invalid request body: {err}")))?;

    let model = request.model;
    let upstream_request =
        UpstreamChatRequest::new(&state.config.upstream, request.messages);
    let token = state
        .transport
        .select_call_token(&state.config.upstream)
        .await;

    tracing::info!(
        model = %model,
        stream = request.stream,
        chat_id = %upstream_request.chat_id,
        token_source = ?token.source,
        "forwarding chat completion upstream"
    );

    let upstream_response = state
        .transport
        .open_chat_stream(&state.config.upstream, &upstream_request, &token.token)
        .await?;
    let byte_stream = upstream_response.bytes_stream();

    let mode = state.config.features.think_tags_mode;
    if request.stream {
        let frames = streaming::chunk_frame_stream(byte_stream, model, mode);
        Ok(streaming::stream_response(frames))
    } else {
        let completion = non_streaming::aggregate_completion(byte_stream, &model, mode).await;
        Ok((StatusCode::OK, Json(completion)).into_response())
    }
}
