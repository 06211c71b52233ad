//! Per-line parsing.

use tracing::trace;

use crate::sse::events::{SseLine, StreamFrame, DONE_SENTINEL, ERROR_SENTINEL};

/// Parse a single line into its component type.
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.trim().to_string());
    }

    // Unknown line format - treat as comment
    SseLine::Comment(line.to_string())
}

/// Turn one line into a frame, if it carries one.
///
/// Only `data:` lines with a non-empty payload produce frames. The payload is
/// matched against the sentinels after trimming; everything else is reply
/// text.
pub fn parse_frame_line(line: &str) -> Option<StreamFrame> {
    match parse_sse_line(line.trim_end_matches('\r')) {
        SseLine::Data(payload) if payload.is_empty() => None,
        SseLine::Data(payload) => {
            if payload == DONE_SENTINEL {
                Some(StreamFrame::Done)
            } else if let Some(message) = payload.strip_prefix(ERROR_SENTINEL) {
                Some(StreamFrame::Error(message.to_string()))
            } else {
                Some(StreamFrame::Data(payload))
            }
        }
        SseLine::Empty => None,
        SseLine::Event(event) => {
            trace!("Ignoring event line: {}", event);
            None
        }
        SseLine::Comment(comment) => {
            trace!("Ignoring non-data line: {}", comment);
            None
        }
    }
}
