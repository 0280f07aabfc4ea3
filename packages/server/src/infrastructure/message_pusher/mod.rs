//! メッセージ送信（通知）の実装
//!
//! Implementations of the `MessagePusher` trait.
//!
//! - `websocket`: per-connection unbounded channels drained by the WebSocket writer task

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
