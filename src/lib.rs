//! monitor-assist: AI chat client for the host monitoring dashboard.
//!
//! Two channels to the AI backend:
//! - [`chat::ChatStreamClient`] streams one reply over SSE-style HTTP
//! - [`websocket::AssistantSession`] keeps a reconnecting WebSocket open for
//!   the interactive SSH assistant
//!
//! The REST endpoints around them live in [`api`].

pub mod adapters;
pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod prelude;
pub mod sse;
pub mod traits;
pub mod websocket;
