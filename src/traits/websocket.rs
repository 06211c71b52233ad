//! WebSocket transport trait abstraction.
//!
//! A [`WsConnector`] performs the opening handshake and returns the socket as
//! two halves: a sink of outgoing text frames and a stream of lifecycle
//! events. Resolving `connect` successfully is the "open" event; everything
//! after that arrives through [`TransportEvent`].

use async_trait::async_trait;
use futures::{Sink, Stream};
use std::pin::Pin;

/// Sending half of an open socket. Closing it sends a close frame.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;

/// Receiving half of an open socket.
pub type EventStream = Pin<Box<dyn Stream<Item = TransportEvent> + Send>>;

/// Both halves of an open socket.
pub struct WsTransport {
    pub sink: FrameSink,
    pub events: EventStream,
}

impl WsTransport {
    pub fn new(sink: FrameSink, events: EventStream) -> Self {
        Self { sink, events }
    }
}

/// How a socket ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// A close handshake completed (in either direction).
    pub clean: bool,
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    /// Close code for a connection that dropped without a close frame.
    pub const ABNORMAL: u16 = 1006;

    pub fn clean(code: u16, reason: impl Into<String>) -> Self {
        Self {
            clean: true,
            code,
            reason: reason.into(),
        }
    }

    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self {
            clean: false,
            code: Self::ABNORMAL,
            reason: reason.into(),
        }
    }
}

/// Something that happened on an open socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A text frame.
    Text(String),
    /// The socket reported an error. A `Closed` event follows.
    Error(String),
    /// The socket is gone.
    Closed(CloseInfo),
}

/// Transport-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Handshake or TCP connect failed
    ConnectFailed(String),
    /// Writing a frame failed
    SendFailed(String),
    /// Socket already closed
    Closed,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::ConnectFailed(msg) => write!(f, "Connection failed: {}", msg),
            TransportError::SendFailed(msg) => write!(f, "Send failed: {}", msg),
            TransportError::Closed => write!(f, "Socket closed"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Opens WebSocket connections.
#[async_trait]
pub trait WsConnector: Send + Sync {
    /// Connect to `url`. Returns once the socket is open.
    async fn connect(&self, url: &str) -> Result<WsTransport, TransportError>;
}
