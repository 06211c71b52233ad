//! Realtime SSH-assistant session over WebSocket.
//!
//! [`AssistantSession`] keeps one socket open for an AI session id, sends a
//! heartbeat every 30 seconds, reconnects after unclean closes with bounded
//! exponential backoff, and dispatches typed server frames to a
//! [`SessionHandler`].

pub mod client;
pub mod handler;
pub mod messages;
pub mod state;

pub use client::AssistantSession;
pub use handler::{ChannelHandler, NoopHandler, SessionEvent, SessionHandler};
pub use messages::{
    generate_message_id, now_millis, ChatMessage, ClientMessage, ServerMessage, WsChat,
    WsCommandComplete, WsCommandOutput, WsError, WsPing, WsReply,
};
pub use state::{CloseOutcome, ConnectionState, ReconnectPolicy, SessionMachine};
