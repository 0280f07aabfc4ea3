//! WebSocket and HTTP entry points.

mod handler;
mod server;
pub mod session;
mod signal;
pub mod state;

pub use handler::ApiError;
pub use server::Server;
pub use session::{Session, SessionState};
pub use signal::shutdown_signal;
pub use state::AppState;
