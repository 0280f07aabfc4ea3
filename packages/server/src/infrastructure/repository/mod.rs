//! Repository implementations.

pub mod inmemory;

pub use inmemory::{
    InMemoryExpenseRepository, InMemoryMessageRepository, InMemorySettlementRepository,
};
