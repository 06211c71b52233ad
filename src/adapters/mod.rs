//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`TungsteniteConnector`] - WebSocket connector using tokio-tungstenite
//!
//! The [`mock`] submodule provides test doubles for both.

pub mod mock;
pub mod reqwest_http;
pub mod tungstenite_ws;

pub use mock::{MockConnector, MockHttpClient, MockPeer, MockResponse};
pub use reqwest_http::ReqwestHttpClient;
pub use tungstenite_ws::TungsteniteConnector;
