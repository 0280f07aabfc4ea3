//! Infrastructure layer
//!
//! Concrete implementations of the domain's collaborator traits, plus the DTOs
//! that define the wire format.

pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod user_directory;
