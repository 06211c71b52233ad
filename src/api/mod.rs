//! Typed wrappers for the REST endpoints around the assistant.
//!
//! - [`ChatSessionApi`] - chat sessions on the AI service
//! - [`AssistantApi`] - binding AI sessions to SSH sessions on the main API
//!
//! Both unwrap the `{code, message, data}` envelope and map HTTP statuses
//! onto [`ApiError`](crate::error::ApiError).

mod assistant;
mod chat;
mod envelope;

pub use assistant::AssistantApi;
pub use chat::ChatSessionApi;
pub use envelope::ApiResponse;
