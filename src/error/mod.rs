//! Error types for the monitor assistant client.
//!
//! Each component has its own error enum, and every variant classifies into
//! an [`ErrorCategory`] so callers can make retry decisions uniformly:
//!
//! | Error | Raised by | Surfaced through |
//! |-------|-----------|------------------|
//! | [`StreamError`] | `chat::ChatStreamClient` | `StreamHandler::on_error` |
//! | [`SessionError`] | `websocket::AssistantSession` | `SessionHandler::on_error` |
//! | [`ApiError`] | `api::ChatSessionApi`, `api::AssistantApi` | `Result` |

mod api;
mod category;
mod session;
mod stream;

pub use api::ApiError;
pub use category::ErrorCategory;
pub use session::SessionError;
pub use stream::StreamError;
