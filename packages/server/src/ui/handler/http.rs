//! HTTP API endpoint handlers.
//!
//! Read-only views of a room. Authorization is left to the surrounding
//! application.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    domain::{MessageId, RoomId, UserId},
    infrastructure::dto::{
        http::{
            ExpensesResponse, HealthResponse, MessagesQuery, MessagesResponse, SummaryQuery,
        },
        websocket::{ExpenseDto, ExpenseSummaryDto, MessageDto},
    },
    ui::state::AppState,
};

use super::error::ApiError;

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        connections: state.registry.connection_count().await,
        active_rooms: state.registry.active_room_count().await,
    })
}

/// Message history of a room, oldest first
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    let before = query.before.map(MessageId::new).transpose()?;

    let posted = state
        .get_messages_usecase
        .execute(&room_id, query.limit, before)
        .await?;

    Ok(Json(MessagesResponse {
        chat_id: room_id.into_string(),
        messages: posted.iter().map(MessageDto::from).collect(),
    }))
}

/// Expenses of a room, newest first
pub async fn get_expenses(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<ExpensesResponse>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    let recorded = state.get_expenses_usecase.execute(&room_id).await?;

    Ok(Json(ExpensesResponse {
        chat_id: room_id.into_string(),
        expenses: recorded.iter().map(ExpenseDto::from).collect(),
    }))
}

/// Balances and suggested settlements of a room
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<ExpenseSummaryDto>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    let viewer = query.viewer.map(UserId::new).transpose()?;
    let report = state.get_expense_summary_usecase.execute(&room_id).await?;

    Ok(Json(ExpenseSummaryDto::from_report(&report, viewer.as_ref())))
}
