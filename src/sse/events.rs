//! Line and frame types.

/// Payload that ends a stream successfully.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Prefix of a payload that ends a stream with an error message.
pub const ERROR_SENTINEL: &str = "[ERROR]";

/// A single line of the event stream, classified by its field name.
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration (e.g., "event: message")
    Event(String),
    /// Data payload (e.g., "data: hello")
    Data(String),
    /// Empty line
    Empty,
    /// Comment or any field we don't use (`id:`, `retry:`, ...)
    Comment(String),
}

/// A meaningful `data:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Reply text to hand to the caller verbatim.
    Data(String),
    /// `[DONE]`: stop reading and complete.
    Done,
    /// `[ERROR]<message>`: stop reading and fail.
    Error(String),
}
