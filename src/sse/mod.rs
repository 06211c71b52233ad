//! Event-stream framing for the chat stream.
//!
//! The chat endpoint answers with a line-oriented body:
//! - `data: <payload>` - a chunk of reply text
//! - `data: [DONE]` - the reply is complete
//! - `data: [ERROR]<message>` - the server gave up
//! - blank lines, `event:`/`id:` lines and `:` comments carry nothing
//!
//! # Module structure
//! - `events` - line and frame types (`SseLine`, `StreamFrame`)
//! - `parser` - per-line classification (`parse_sse_line`, `parse_frame_line`)
//! - `decoder` - incremental byte decoding (`Utf8Decoder`, `FrameDecoder`)

mod decoder;
mod events;
mod parser;

pub use decoder::{FrameDecoder, Utf8Decoder};
pub use events::{SseLine, StreamFrame, DONE_SENTINEL, ERROR_SENTINEL};
pub use parser::{parse_frame_line, parse_sse_line};
