//! UseCase layer
//!
//! One struct per operation. Each depends only on domain traits and the
//! [`RoomBroadcaster`], and reports failures through its own error enum whose
//! [`ErrorKind`] the UI layer turns into an ack code.

pub mod add_expense;
pub mod broadcast;
pub mod connect_participant;
pub mod delete_expense;
pub mod disconnect_participant;
pub mod error;
pub mod get_expense_summary;
pub mod get_expenses;
pub mod get_messages;
pub mod join_room;
pub mod send_message;
pub mod settle_debt;
pub mod typing;

#[cfg(test)]
pub(crate) mod test_support;

pub use add_expense::{AddExpenseCommand, AddExpenseUseCase};
pub use broadcast::RoomBroadcaster;
pub use connect_participant::ConnectParticipantUseCase;
pub use delete_expense::DeleteExpenseUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{
    AddExpenseError, DeleteExpenseError, ErrorKind, IdentityMismatch, QueryError,
    SendMessageError, SettleDebtError, TypingError,
};
pub use get_expense_summary::GetExpenseSummaryUseCase;
pub use get_expenses::GetExpensesUseCase;
pub use get_messages::{GetMessagesUseCase, MAX_MESSAGE_PAGE};
pub use join_room::JoinRoomUseCase;
pub use send_message::{SendMessageCommand, SendMessageUseCase};
pub use settle_debt::{SettleDebtCommand, SettleDebtUseCase};
pub use typing::TypingUseCase;
