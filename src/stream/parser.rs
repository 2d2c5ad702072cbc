use smallvec::SmallVec;

use super::{Phase, UpstreamEvent};
use crate::protocol::upstream::{UpstreamErrorBody, UpstreamEventFrame};

const DATA_PREFIX: &str = "data: ";

/// Decode one complete SSE line into zero or more events.
///
/// Lines without the `data: ` prefix, and payloads that fail to decode as
/// JSON, are ignored. A single line can yield both a content fragment and a
/// terminal marker when the payload carries `delta_content` alongside
/// `done`, in which case the content comes first.
///
/// Errors are searched top-level first, then `data.error`, then
/// `data.inner.error`; an error suppresses any content in the same payload.
pub fn parse_line(line: &str) -> SmallVec<[UpstreamEvent; 2]> {
    let mut events = SmallVec::new();

    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return events;
    };
    let Ok(frame) = serde_json::from_str::<UpstreamEventFrame>(payload) else {
        return events;
    };

    if let Some(error) = first_error(&frame) {
        events.push(UpstreamEvent::ErrorSignal {
            code: error.code,
            detail: error.detail.clone(),
        });
        return events;
    }

    let Some(data) = frame.data else {
        return events;
    };

    if let Some(text) = data.delta_content {
        if !text.is_empty() {
            let phase = if data.phase.as_deref() == Some("thinking") {
                Phase::Thinking
            } else {
                Phase::Answer
            };
            events.push(UpstreamEvent::ContentFragment { phase, text });
        }
    }

    if data.done == Some(true) || data.phase.as_deref() == Some("done") {
        events.push(UpstreamEvent::Terminal);
    }

    events
}

fn first_error(frame: &UpstreamEventFrame) -> Option<&UpstreamErrorBody> {
    if let Some(error) = &frame.error {
        return Some(error);
    }
    let data = frame.data.as_ref()?;
    if let Some(error) = &data.error {
        return Some(error);
    }
    data.inner.as_ref()?.error.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thinking_fragment() {
        let events =
            parse_line(r#"data: {"data": {"delta_content": "hmm", "phase": "thinking"}}"#);
        assert_eq!(
            events.as_slice(),
            &[UpstreamEvent::ContentFragment {
                phase: Phase::Thinking,
                text: "hmm".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_phase_treated_as_answer() {
        let events = parse_line(r#"data: {"data": {"delta_content": "x", "phase": "other"}}"#);
        assert_eq!(
            events.as_slice(),
            &[UpstreamEvent::ContentFragment {
                phase: Phase::Answer,
                text: "x".to_string(),
            }]
        );
    }

    #[test]
    fn test_done_flag() {
        let events = parse_line(r#"data: {"data": {"done": true}}"#);
        assert_eq!(events.as_slice(), &[UpstreamEvent::Terminal]);
    }

    #[test]
    fn test_done_phase() {
        let events = parse_line(r#"data: {"data": {"phase": "done"}}"#);
        assert_eq!(events.as_slice(), &[UpstreamEvent::Terminal]);
    }

    #[test]
    fn test_content_then_done_in_one_payload() {
        let events = parse_line(
            r#"data: {"data": {"delta_content": "bye", "phase": "answer", "done": true}}"#,
        );
        assert_eq!(
            events.as_slice(),
            &[
                UpstreamEvent::ContentFragment {
                    phase: Phase::Answer,
                    text: "bye".to_string(),
                },
                UpstreamEvent::Terminal,
            ]
        );
    }

    #[test]
    fn test_error_precedence_over_content() {
        let events = parse_line(
            r#"data: {"data": {"delta_content": "x", "error": {"code": 7, "detail": "boom"}}}"#,
        );
        assert_eq!(
            events.as_slice(),
            &[UpstreamEvent::ErrorSignal {
                code: Some(7),
                detail: Some("boom".to_string()),
            }]
        );
    }

    #[test]
    fn test_inner_error() {
        let events = parse_line(r#"data: {"data": {"inner": {"error": {"detail": "deep"}}}}"#);
        assert_eq!(
            events.as_slice(),
            &[UpstreamEvent::ErrorSignal {
                code: None,
                detail: Some("deep".to_string()),
            }]
        );
    }

    #[test]
    fn test_non_data_line_ignored() {
        assert!(parse_line("event: ping").is_empty());
        assert!(parse_line("").is_empty());
        assert!(parse_line(": keepalive").is_empty());
    }

    #[test]
    fn test_malformed_json_ignored() {
        assert!(parse_line("data: {not json").is_empty());
    }

    #[test]
    fn test_empty_delta_content_skipped() {
        let events = parse_line(r#"data: {"data": {"delta_content": "", "phase": "answer"}}"#);
        assert!(events.is_empty());
    }
}
