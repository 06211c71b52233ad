//! Trait seams between the client logic and its transports.
//!
//! # Traits
//!
//! - [`HttpClient`] - GET/POST/DELETE plus a streaming POST for chat replies
//! - [`WsConnector`] - opens a WebSocket and hands back its two halves

pub mod http;
pub mod websocket;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
pub use websocket::{
    CloseInfo, EventStream, FrameSink, TransportError, TransportEvent, WsConnector, WsTransport,
};
