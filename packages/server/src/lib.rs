//! Real-time room chat and shared expense ledger server.
//!
//! Layers, from the inside out:
//! - [`domain`]: value objects, entities, the balance engine and collaborator traits
//! - [`usecase`]: one struct per operation
//! - [`infrastructure`]: in-memory storage, WebSocket delivery, user directories, DTOs
//! - [`ui`]: axum router, WebSocket/HTTP handlers and the per-connection session

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
