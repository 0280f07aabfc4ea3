//! Data Transfer Objects (DTOs) for the chat and expense server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: inbound client frames and outbound event payloads
//! - `http`: HTTP API query parameters and response bodies
//! - `directory`: user records exchanged with the user directory
//! - `encoder`: room events rendered as broadcast frames

pub mod conversion;
pub mod directory;
pub mod encoder;
pub mod http;
pub mod websocket;
