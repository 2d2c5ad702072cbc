use std::time::{SystemTime, UNIX_EPOCH};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[inline]
pub(crate) fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

#[inline]
pub(crate) fn unix_now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis())
}

/// Response object id in the `chatcmpl-{unix_secs}` shape.
pub(crate) fn completion_id() -> String {
    let mut out = String::with_capacity(28);
    out.push_str("chatcmpl-");
    out.push_str(&unix_now_secs().to_string());
    out
}

/// Upstream session identifiers: `(chat_id, message_id)`.
///
/// The chat id is `{millis}-{secs}` and the message id is `{millis}`,
/// matching what the upstream web client generates.
pub(crate) fn session_ids() -> (String, String) {
    let millis = unix_now_millis();
    let secs = unix_now_secs();
    (format!("{millis}-{secs}"), millis.to_string())
}

/// Current wall-clock time as an RFC 3339 timestamp.
pub(crate) fn rfc3339_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
