use bytes::Bytes;
use futures_util::Stream;

use crate::config::ThinkTagsMode;
use crate::protocol::openai::ChatCompletion;
use crate::stream::thinking;
use crate::stream::{LineReassembler, Phase, UpstreamEvent};

/// Absorb the full upstream stream into one completion object.
///
/// Thinking fragments are normalized before appending; answer fragments go
/// in verbatim. A terminal marker, an in-stream error, a transport error,
/// and a plain connection close all end aggregation the same way: the
/// response carries whatever content was collected, with `finish_reason`
/// fixed to `"stop"`.
pub async fn aggregate_completion<S, E>(
    byte_stream: S,
    model: &str,
    mode: ThinkTagsMode,
) -> ChatCompletion
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Debug,
{
    use futures_util::StreamExt;

    futures_util::pin_mut!(byte_stream);
    let mut reassembler = LineReassembler::new();
    let mut content = String::new();

    'read: while let Some(chunk) = byte_stream.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(error = ?err, "upstream read failed mid-aggregation");
                break;
            }
        };
        for event in reassembler.feed(&bytes) {
            match event {
                UpstreamEvent::ContentFragment {
                    phase: Phase::Thinking,
                    text,
                } => {
                    let normalized = thinking::normalize(&text, mode);
                    if !normalized.is_empty() {
                        content.push_str(&normalized);
                    }
                }
                UpstreamEvent::ContentFragment {
                    phase: Phase::Answer,
                    text,
                } => content.push_str(&text),
                UpstreamEvent::Terminal => break 'read,
                UpstreamEvent::ErrorSignal { code, detail } => {
                    tracing::warn!(
                        code,
                        detail = detail.as_deref().unwrap_or(""),
                        "upstream signaled in-stream error, ending aggregation"
                    );
                    break 'read;
                }
            }
        }
    }

    tracing::debug!(
        lines = reassembler.lines_seen(),
        chars = content.len(),
        "upstream stream ended, returning aggregated completion"
    );
    ChatCompletion::assistant(model, content)
}
