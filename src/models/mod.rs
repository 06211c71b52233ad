//! Data types exchanged with the AI and monitoring services.
//!
//! All REST payloads use camelCase field names on the wire. Timestamps are
//! Unix milliseconds.

mod assistant;
mod chat;

pub use assistant::{ActiveStatus, ConnectAiRequest, ConnectAiResponse, SshSessionBinding};
pub use chat::{
    ChatMessageResponse, ChatResponse, ChatRole, CreateSessionRequest, CreateSessionResponse,
    SendMessageRequest, SessionInfo,
};
