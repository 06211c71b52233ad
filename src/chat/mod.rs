//! Streaming chat replies.
//!
//! [`ChatStreamClient::send_message_stream`] posts one message to the AI
//! service and feeds the reply to a [`StreamHandler`] as it arrives.

mod handler;
mod stream;

pub use handler::{StreamCallbacks, StreamHandler};
pub use stream::ChatStreamClient;
