use axum::response::Response;
use bytes::Bytes;
use futures_util::Stream;
use smallvec::SmallVec;

use crate::config::ThinkTagsMode;
use crate::protocol::openai::ChatCompletionChunk;
use crate::stream::thinking;
use crate::stream::{LineReassembler, Phase, UpstreamEvent};

const DONE_FRAME: &[u8] = b"data: [DONE]\n\n";

/// Outbound SSE frames waiting to be yielded, in emission order.
struct PendingFrames {
    frames: SmallVec<[Bytes; 4]>,
    head: usize,
}

impl PendingFrames {
    fn new() -> Self {
        Self {
            frames: SmallVec::new(),
            head: 0,
        }
    }

    fn push(&mut self, frame: Bytes) {
        self.frames.push(frame);
    }

    fn push_chunk(&mut self, chunk: &ChatCompletionChunk) {
        self.frames.push(sse_json_frame(chunk));
    }

    fn pop_front(&mut self) -> Option<Bytes> {
        if self.head >= self.frames.len() {
            return None;
        }
        let frame = std::mem::take(&mut self.frames[self.head]);
        self.head += 1;
        if self.head == self.frames.len() {
            self.frames.clear();
            self.head = 0;
        }
        Some(frame)
    }
}

fn sse_json_frame(chunk: &ChatCompletionChunk) -> Bytes {
    // Serialization of these derived types cannot fail in practice.
    let json = serde_json::to_string(chunk).unwrap_or_default();
    Bytes::from(format!("data: {json}\n\n"))
}

/// Transcode the upstream byte stream into OpenAI chunk frames.
///
/// The role-announcement chunk is queued before the first upstream read.
/// Whether the upstream ends with a done marker, an in-stream error, or a
/// plain connection close, exactly one finish chunk and one `[DONE]` frame
/// close the stream. Dropping the returned stream drops the upstream body with it,
/// which closes the upstream connection on client disconnect.
pub fn chunk_frame_stream<S, E>(
    byte_stream: S,
    model: String,
    mode: ThinkTagsMode,
) -> impl Stream<Item = Bytes> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Debug + Send + 'static,
{
    use futures_util::StreamExt;

    let mut pending = PendingFrames::new();
    pending.push_chunk(&ChatCompletionChunk::role(&model));

    futures_util::stream::unfold(
        (
            Box::pin(byte_stream),
            LineReassembler::new(),
            pending,
            model,
            false,
        ),
        move |(mut stream, mut reassembler, mut pending, model, mut finished)| async move {
            loop {
                if let Some(frame) = pending.pop_front() {
                    return Some((frame, (stream, reassembler, pending, model, finished)));
                }
                if finished {
                    return None;
                }

                match stream.as_mut().next().await {
                    Some(Ok(bytes)) => {
                        for event in reassembler.feed(&bytes) {
                            handle_event(event, &model, mode, &mut pending, &mut finished);
                        }
                    }
                    Some(Err(err)) => {
                        tracing::warn!(error = ?err, "upstream read failed mid-stream, closing response");
                        finish(&model, &mut pending, &mut finished);
                    }
                    None => finish(&model, &mut pending, &mut finished),
                }
            }
        },
    )
}

fn handle_event(
    event: UpstreamEvent,
    model: &str,
    mode: ThinkTagsMode,
    pending: &mut PendingFrames,
    finished: &mut bool,
) {
    if *finished {
        return;
    }
    match event {
        UpstreamEvent::ContentFragment {
            phase: Phase::Thinking,
            text,
        } => {
            let normalized = thinking::normalize(&text, mode);
            if !normalized.is_empty() {
                pending.push_chunk(&ChatCompletionChunk::reasoning(model, normalized));
            }
        }
        UpstreamEvent::ContentFragment {
            phase: Phase::Answer,
            text,
        } => pending.push_chunk(&ChatCompletionChunk::content(model, text)),
        UpstreamEvent::Terminal => finish(model, pending, finished),
        UpstreamEvent::ErrorSignal { code, detail } => {
            tracing::warn!(
                code,
                detail = detail.as_deref().unwrap_or(""),
                "upstream signaled in-stream error, closing response"
            );
            finish(model, pending, finished);
        }
    }
}

fn finish(model: &str, pending: &mut PendingFrames, finished: &mut bool) {
    if *finished {
        return;
    }
    *finished = true;
    pending.push_chunk(&ChatCompletionChunk::finish(model));
    pending.push(Bytes::from_static(DONE_FRAME));
}

/// Wrap a frame stream in an SSE response with buffering disabled.
pub(crate) fn stream_response<S>(frames: S) -> Response
where
    S: Stream<Item = Bytes> + Send + 'static,
{
    use futures_util::StreamExt;

    let body =
        axum::body::Body::from_stream(frames.map(Ok::<_, std::convert::Infallible>));
    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(
        http::header::CACHE_CONTROL,
        http::HeaderValue::from_static("no-cache"),
    );
    headers.insert(
        http::header::CONNECTION,
        http::HeaderValue::from_static("keep-alive"),
    );
    headers.insert(
        http::HeaderName::from_static("x-accel-buffering"),
        http::HeaderValue::from_static("no"),
    );
    response
}
