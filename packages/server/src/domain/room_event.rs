//! Room events and their wire encoding seam
//!
//! Use cases decide *what* is published to a room; the encoder decides how it
//! looks on the wire. The JSON implementation lives in the infrastructure layer.

use super::{ExpenseId, PostedMessage, RecordedExpense, RecordedSettlement, UserId};

/// Something broadcast to the members of one room
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoomEvent<'a> {
    MessagePosted(&'a PostedMessage),
    UserTyping {
        user_id: &'a UserId,
        username: &'a str,
    },
    UserStoppedTyping(&'a UserId),
    ExpenseAdded(&'a RecordedExpense),
    ExpenseDeleted(&'a ExpenseId),
    DebtSettled(&'a RecordedSettlement),
}

pub trait RoomEventEncoder: Send + Sync {
    fn encode(&self, event: RoomEvent<'_>) -> String;
}
