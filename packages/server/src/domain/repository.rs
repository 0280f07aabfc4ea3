//! Repository trait definitions
//!
//! The persistence collaborators the core needs. Concrete implementations live in
//! the infrastructure layer; use cases depend only on these traits.

use async_trait::async_trait;

use super::{ChatMessage, Expense, ExpenseId, MessageId, RepositoryError, RoomId, Settlement};

/// Append-only store of chat messages, grouped by room
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a message and return it as persisted
    async fn append(&self, message: ChatMessage) -> Result<ChatMessage, RepositoryError>;

    /// Most recent `limit` messages of the room in ascending order
    ///
    /// With `before` set, only messages ordered strictly before that message are
    /// considered. An unknown cursor is a `MessageNotFound` error.
    async fn list(
        &self,
        room_id: &RoomId,
        limit: usize,
        before: Option<MessageId>,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;
}

/// Store of expense records, grouped by room
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn add(&self, expense: Expense) -> Result<Expense, RepositoryError>;

    async fn get(
        &self,
        room_id: &RoomId,
        expense_id: &ExpenseId,
    ) -> Result<Expense, RepositoryError>;

    /// Remove an expense and return the removed record
    async fn remove(
        &self,
        room_id: &RoomId,
        expense_id: &ExpenseId,
    ) -> Result<Expense, RepositoryError>;

    /// Full ledger snapshot of a room, in insertion order
    async fn list(&self, room_id: &RoomId) -> Result<Vec<Expense>, RepositoryError>;
}

/// Store of recorded settlements, grouped by room
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettlementRepository: Send + Sync {
    async fn add(&self, settlement: Settlement) -> Result<Settlement, RepositoryError>;

    async fn list(&self, room_id: &RoomId) -> Result<Vec<Settlement>, RepositoryError>;
}
