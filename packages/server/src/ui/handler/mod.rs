//! Request handlers.

mod error;
mod http;
mod websocket;

pub use error::ApiError;
pub use http::{get_expenses, get_messages, get_summary, health_check};
pub use websocket::websocket_handler;
