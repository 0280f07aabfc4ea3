//! WebSocket message DTOs
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>, "ack": <id>?}`.
//! Inbound frames are parsed into [`ClientEvent`]; outbound frames are built with
//! [`encode_frame`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{UserId, ValueObjectError};

/// Event names used on the wire
pub mod event {
    // client -> server
    pub const JOIN_CHAT: &str = "joinChat";
    pub const LEAVE_CHAT: &str = "leaveChat";
    pub const GET_MESSAGES: &str = "getMessages";
    pub const SEND_MESSAGE: &str = "sendMessage";
    pub const TYPING: &str = "typing";
    pub const STOPPED_TYPING: &str = "stoppedTyping";
    pub const GET_EXPENSES: &str = "getExpenses";
    pub const ADD_EXPENSE: &str = "addExpense";
    pub const DELETE_EXPENSE: &str = "deleteExpense";
    pub const GET_EXPENSE_SUMMARY: &str = "getExpenseSummary";
    pub const SETTLE_DEBT: &str = "settleDebt";

    // server -> client
    pub const ACK: &str = "ack";
    pub const RECEIVE_MESSAGE: &str = "receiveMessage";
    pub const USER_TYPING: &str = "userTyping";
    pub const USER_STOPPED_TYPING: &str = "userStoppedTyping";
    pub const NEW_EXPENSE: &str = "newExpense";
    pub const EXPENSE_DELETED: &str = "expenseDeleted";
    pub const DEBT_SETTLED: &str = "debtSettled";
}

// ========================================
// Inbound
// ========================================

/// Raw inbound frame
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub ack: Option<u64>,
}

/// Why an inbound frame could not be turned into a [`ClientEvent`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
    #[error("invalid payload for '{event}': {reason}")]
    InvalidPayload { event: String, reason: String },
}

/// A user reference as clients send it: a bare id, or an object carrying `_id`/`id`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Number(u64),
    Object {
        #[serde(alias = "_id")]
        id: String,
    },
}

impl UserRef {
    /// Normalize to the single internal id representation.
    pub fn into_user_id(self) -> Result<UserId, ValueObjectError> {
        match self {
            Self::Id(id) | Self::Object { id } => UserId::new(id),
            Self::Number(n) => UserId::new(n.to_string()),
        }
    }
}

/// A client-supplied timestamp: epoch milliseconds or an RFC 3339 string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimestampRef {
    Millis(i64),
    Text(String),
}

impl TimestampRef {
    /// Epoch milliseconds, or `None` when the value cannot be interpreted.
    pub fn to_millis(&self) -> Option<i64> {
        match self {
            Self::Millis(ms) => Some(*ms),
            Self::Text(text) => wayfare_shared::time::parse_rfc3339_millis(text),
        }
    }
}

/// `getMessages` accepts a bare room id or a page request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GetMessagesPayload {
    Room(String),
    Page(MessagePageRequest),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePageRequest {
    pub chat_id: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub before: Option<String>,
}

impl GetMessagesPayload {
    pub fn chat_id(&self) -> &str {
        match self {
            Self::Room(id) => id,
            Self::Page(page) => &page.chat_id,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Room(_) => None,
            Self::Page(page) => page.limit,
        }
    }

    pub fn before(&self) -> Option<&str> {
        match self {
            Self::Room(_) => None,
            Self::Page(page) => page.before.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub chat_id: String,
    pub content: String,
    #[serde(default)]
    pub sender: Option<UserRef>,
    #[serde(default)]
    pub timestamp: Option<TimestampRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub chat_id: String,
    #[serde(default)]
    pub user_id: Option<UserRef>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedTypingPayload {
    pub chat_id: String,
    #[serde(default)]
    pub user_id: Option<UserRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddExpensePayload {
    pub chat_id: String,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub paid_by: Option<UserRef>,
    #[serde(alias = "splitAmong")]
    pub split_between: Vec<UserRef>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub timestamp: Option<TimestampRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteExpensePayload {
    pub chat_id: String,
    pub expense_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleDebtPayload {
    pub chat_id: String,
    pub from: UserRef,
    pub to: UserRef,
    pub amount: f64,
}

/// A parsed inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    JoinChat(String),
    LeaveChat(String),
    GetMessages(GetMessagesPayload),
    SendMessage(SendMessagePayload),
    Typing(TypingPayload),
    StoppedTyping(StoppedTypingPayload),
    GetExpenses(String),
    AddExpense(AddExpensePayload),
    DeleteExpense(DeleteExpensePayload),
    GetExpenseSummary(String),
    SettleDebt(SettleDebtPayload),
}

impl ClientEvent {
    pub fn parse(name: &str, data: Value) -> Result<Self, FrameError> {
        fn payload<T: serde::de::DeserializeOwned>(
            name: &str,
            data: Value,
        ) -> Result<T, FrameError> {
            serde_json::from_value(data).map_err(|e| FrameError::InvalidPayload {
                event: name.to_string(),
                reason: e.to_string(),
            })
        }

        match name {
            event::JOIN_CHAT => payload(name, data).map(Self::JoinChat),
            event::LEAVE_CHAT => payload(name, data).map(Self::LeaveChat),
            event::GET_MESSAGES => payload(name, data).map(Self::GetMessages),
            event::SEND_MESSAGE => payload(name, data).map(Self::SendMessage),
            event::TYPING => payload(name, data).map(Self::Typing),
            event::STOPPED_TYPING => payload(name, data).map(Self::StoppedTyping),
            event::GET_EXPENSES => payload(name, data).map(Self::GetExpenses),
            event::ADD_EXPENSE => payload(name, data).map(Self::AddExpense),
            event::DELETE_EXPENSE => payload(name, data).map(Self::DeleteExpense),
            event::GET_EXPENSE_SUMMARY => payload(name, data).map(Self::GetExpenseSummary),
            event::SETTLE_DEBT => payload(name, data).map(Self::SettleDebt),
            other => Err(FrameError::UnknownEvent(other.to_string())),
        }
    }

    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinChat(_) => event::JOIN_CHAT,
            Self::LeaveChat(_) => event::LEAVE_CHAT,
            Self::GetMessages(_) => event::GET_MESSAGES,
            Self::SendMessage(_) => event::SEND_MESSAGE,
            Self::Typing(_) => event::TYPING,
            Self::StoppedTyping(_) => event::STOPPED_TYPING,
            Self::GetExpenses(_) => event::GET_EXPENSES,
            Self::AddExpense(_) => event::ADD_EXPENSE,
            Self::DeleteExpense(_) => event::DELETE_EXPENSE,
            Self::GetExpenseSummary(_) => event::GET_EXPENSE_SUMMARY,
            Self::SettleDebt(_) => event::SETTLE_DEBT,
        }
    }

    /// Room the event addresses
    pub fn chat_id(&self) -> &str {
        match self {
            Self::JoinChat(id)
            | Self::LeaveChat(id)
            | Self::GetExpenses(id)
            | Self::GetExpenseSummary(id) => id,
            Self::GetMessages(p) => p.chat_id(),
            Self::SendMessage(p) => &p.chat_id,
            Self::Typing(p) => &p.chat_id,
            Self::StoppedTyping(p) => &p.chat_id,
            Self::AddExpense(p) => &p.chat_id,
            Self::DeleteExpense(p) => &p.chat_id,
            Self::SettleDebt(p) => &p.chat_id,
        }
    }
}

// ========================================
// Outbound
// ========================================

#[derive(Debug, Serialize)]
struct ServerFrame<'a, T: Serialize> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ack: Option<u64>,
    data: T,
}

/// Serialize an outbound frame.
pub fn encode_frame<T: Serialize>(event: &str, ack: Option<u64>, data: &T) -> String {
    serde_json::to_string(&ServerFrame { event, ack, data }).unwrap_or_else(|e| {
        tracing::error!("Failed to encode '{}' frame: {}", event, e);
        format!(r#"{{"event":"{}","data":null}}"#, event)
    })
}

/// A chat message as broadcast to room members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub chat_id: String,
    pub sender: String,
    pub sender_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sender_picture: Option<String>,
    pub sender_verified: bool,
    pub content: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub chat_id: String,
    pub description: String,
    pub amount: f64,
    pub paid_by: String,
    pub paid_by_name: String,
    pub split_between: Vec<String>,
    pub split_between_names: Vec<String>,
    pub category: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub chat_id: String,
    pub from: String,
    pub from_name: String,
    pub to: String,
    pub to_name: String,
    pub amount: f64,
    pub settled: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDto {
    pub user_id: String,
    pub name: String,
    pub amount: f64,
    /// `owed`, `owes` or `settled`
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDto {
    pub from: String,
    pub from_name: String,
    pub to: String,
    pub to_name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummaryDto {
    pub balances: Vec<BalanceDto>,
    /// Suggested transfers
    pub settlements: Vec<TransferDto>,
    /// Settlements already recorded in the room
    pub recorded: Vec<SettlementDto>,
    pub total_expenses: usize,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypingDto {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStoppedTypingDto {
    pub user_id: String,
}

/// Body of an `ack` frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum AckDto {
    Messages {
        success: bool,
        messages: Vec<MessageDto>,
    },
    Message {
        success: bool,
        message: MessageDto,
    },
    Expenses {
        success: bool,
        expenses: Vec<ExpenseDto>,
    },
    Expense {
        success: bool,
        expense: ExpenseDto,
    },
    ExpenseDeleted {
        success: bool,
        expense_id: String,
    },
    Summary {
        success: bool,
        summary: ExpenseSummaryDto,
    },
    Settlement {
        success: bool,
        settlement: SettlementDto,
    },
    Room {
        success: bool,
        chat_id: String,
    },
    Done {
        success: bool,
    },
    Failure {
        success: bool,
        code: &'static str,
        error: String,
    },
}

impl AckDto {
    pub fn done() -> Self {
        Self::Done { success: true }
    }

    pub fn failure(code: &'static str, error: impl Into<String>) -> Self {
        Self::Failure {
            success: false,
            code,
            error: error.into(),
        }
    }
}
