//! Domain layer
//!
//! Value objects, entities, pure engines and the collaborator traits the use cases
//! depend on. Nothing here knows about WebSocket or HTTP.

pub mod balance;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod presence;
pub mod repository;
pub mod room_event;
pub mod room_registry;
pub mod user_directory;
pub mod value_object;
pub mod view;

pub use balance::{
    BALANCE_EPSILON, BalanceSheet, BalanceStatus, ExpenseSummary, NetBalance, Transfer,
    compute_balances, simplify_debts, summarize,
};
pub use entity::{ChatMessage, Expense, ExpenseCategory, Settlement, SplitBetween, UserProfile};
pub use error::{DirectoryError, MessagePushError, RepositoryError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use presence::{ExpiredTyping, TypingEntry, TypingTracker};
pub use repository::{ExpenseRepository, MessageRepository, SettlementRepository};
pub use room_event::{RoomEvent, RoomEventEncoder};
pub use room_registry::{JoinOutcome, RoomRegistry};
pub use user_directory::UserDirectory;
pub use value_object::{
    Amount, ConnectionId, Description, ExpenseId, MessageContent, MessageId, RoomId,
    SettlementId, Timestamp, UserId,
};
pub use view::{PostedMessage, ProfileBook, RecordedExpense, RecordedSettlement, SummaryReport};
