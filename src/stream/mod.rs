//! Upstream SSE decoding and OpenAI chunk emission.
//!
//! The upstream speaks a line-oriented SSE dialect: each event is a single
//! `data: {...}` line carrying phase-tagged content deltas, a done marker,
//! or an error payload at one of several nesting depths. This module turns
//! raw network bytes into [`UpstreamEvent`]s and re-encodes them as OpenAI
//! chat-completion chunks.

pub mod parser;
pub mod reassembler;
pub mod thinking;

pub use reassembler::LineReassembler;

/// Which phase of the response a content fragment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Model deliberation, surfaced as `reasoning_content`.
    Thinking,
    /// The answer proper, surfaced as `content`.
    Answer,
}

/// One interpreted upstream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamEvent {
    /// A content delta tagged with its phase.
    ContentFragment { phase: Phase, text: String },
    /// The upstream marked the response complete.
    Terminal,
    /// The upstream reported an in-stream error.
    ErrorSignal {
        code: Option<i64>,
        detail: Option<String>,
    },
}
