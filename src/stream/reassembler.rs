use smallvec::SmallVec;

use super::parser::parse_line;
use super::UpstreamEvent;

/// Reassembles complete SSE lines from arbitrarily fragmented byte reads.
///
/// Network reads split the upstream stream at arbitrary byte boundaries, so
/// a single `data:` line may arrive across several reads and one read may
/// carry several lines. Bytes after the last newline are buffered until the
/// next read completes them.
///
/// Once a terminal or error event is seen the reassembler latches: the
/// pending buffer is dropped and every later `feed` produces nothing.
#[derive(Debug, Default)]
pub struct LineReassembler {
    pending: Vec<u8>,
    terminal: bool,
    lines_seen: u64,
}

impl LineReassembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a terminal or error event has been observed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Number of complete lines processed so far, including empty ones.
    #[must_use]
    pub fn lines_seen(&self) -> u64 {
        self.lines_seen
    }

    /// Feed one network read, returning the events decoded from every line
    /// completed by it.
    pub fn feed(&mut self, bytes: &[u8]) -> SmallVec<[UpstreamEvent; 2]> {
        let mut events = SmallVec::new();
        if self.terminal {
            return events;
        }

        self.pending.extend_from_slice(bytes);

        let mut start = 0usize;
        while let Some(pos) = memchr::memchr(b'\n', &self.pending[start..]) {
            let end = start + pos;
            let mut line = &self.pending[start..end];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }
            self.lines_seen += 1;

            // Non-UTF-8 lines are dropped, same as undecodable JSON.
            if let Ok(text) = std::str::from_utf8(line) {
                for event in parse_line(text) {
                    let stop = matches!(
                        event,
                        UpstreamEvent::Terminal | UpstreamEvent::ErrorSignal { .. }
                    );
                    events.push(event);
                    if stop {
                        self.terminal = true;
                        self.pending.clear();
                        return events;
                    }
                }
            }
            start = end + 1;
        }
        self.pending.drain(..start);
        events
    }
}
