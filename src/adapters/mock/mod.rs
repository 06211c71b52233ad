//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`MockConnector`] - WebSocket connector whose server side is driven by
//!   the test through [`MockPeer`]

pub mod http;
pub mod websocket;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use websocket::{ConnectBehavior, MockConnector, MockPeer};
