//! In-memory repositories
//!
//! HashMaps behind a `tokio::sync::Mutex`, keyed by room. Data lives for the
//! lifetime of the process.

mod expense;
mod message;
mod settlement;

pub use expense::InMemoryExpenseRepository;
pub use message::InMemoryMessageRepository;
pub use settlement::InMemorySettlementRepository;
