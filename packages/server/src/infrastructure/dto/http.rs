//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::{ExpenseDto, MessageDto};

/// Query parameters of `GET /api/rooms/{room_id}/messages`
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<usize>,
    pub before: Option<String>,
}

/// Query parameters of `GET /api/rooms/{room_id}/summary`
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    /// User rendered as "You"
    pub viewer: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesResponse {
    pub chat_id: String,
    pub messages: Vec<MessageDto>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensesResponse {
    pub chat_id: String,
    pub expenses: Vec<ExpenseDto>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub connections: usize,
    pub active_rooms: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
