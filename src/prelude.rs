//! Prelude module for convenient imports.
//!
//! ```ignore
//! use monitor_assist::prelude::*;
//! ```

// Clients
pub use crate::api::{AssistantApi, ChatSessionApi};
pub use crate::chat::{ChatStreamClient, StreamCallbacks, StreamHandler};
pub use crate::websocket::{AssistantSession, ChannelHandler, SessionEvent, SessionHandler};

// Configuration
pub use crate::config::ClientConfig;
pub use crate::websocket::ReconnectPolicy;

// Model types
pub use crate::models::{ChatRole, SendMessageRequest, SessionInfo};
pub use crate::websocket::{ChatMessage, ClientMessage, ConnectionState, ServerMessage};

// Errors
pub use crate::error::{ApiError, ErrorCategory, SessionError, StreamError};
