//! Shared application state.

use std::{sync::Arc, time::Duration};

use wayfare_shared::time::Clock;

use crate::{
    config::ServerConfig,
    domain::{MessagePusher, RoomRegistry, TypingTracker, UserDirectory},
    infrastructure::{
        dto::encoder::JsonRoomEventEncoder,
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryExpenseRepository, InMemoryMessageRepository, InMemorySettlementRepository,
        },
    },
    usecase::{
        AddExpenseUseCase, ConnectParticipantUseCase, DeleteExpenseUseCase,
        DisconnectParticipantUseCase, GetExpenseSummaryUseCase, GetExpensesUseCase,
        GetMessagesUseCase, JoinRoomUseCase, RoomBroadcaster, SendMessageUseCase,
        SettleDebtUseCase, TypingUseCase,
    },
};

/// Use cases and settings shared by every handler
pub struct AppState {
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub get_messages_usecase: Arc<GetMessagesUseCase>,
    pub typing_usecase: Arc<TypingUseCase>,
    pub add_expense_usecase: Arc<AddExpenseUseCase>,
    pub delete_expense_usecase: Arc<DeleteExpenseUseCase>,
    pub get_expenses_usecase: Arc<GetExpensesUseCase>,
    pub get_expense_summary_usecase: Arc<GetExpenseSummaryUseCase>,
    pub settle_debt_usecase: Arc<SettleDebtUseCase>,
    /// Delivers acks to the requesting connection
    pub message_pusher: Arc<dyn MessagePusher>,
    /// Read-only access for the health endpoint
    pub registry: Arc<RoomRegistry>,
    pub idle_timeout: Duration,
    pub ping_interval: Duration,
}

impl AppState {
    /// Wire every use case against in-memory storage and the WebSocket pusher.
    pub fn in_memory(
        config: &ServerConfig,
        user_directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        // 1. Repository / Registry / Tracker
        let message_repository = Arc::new(InMemoryMessageRepository::new());
        let expense_repository = Arc::new(InMemoryExpenseRepository::new());
        let settlement_repository = Arc::new(InMemorySettlementRepository::new());
        let registry = Arc::new(RoomRegistry::new());
        let typing = Arc::new(TypingTracker::new(config.typing_ttl_ms()));

        // 2. MessagePusher / Broadcaster
        let message_pusher = Arc::new(WebSocketMessagePusher::default());
        let broadcaster = Arc::new(RoomBroadcaster::new(
            registry.clone(),
            message_pusher.clone(),
            Arc::new(JsonRoomEventEncoder),
        ));

        // 3. UseCases
        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                message_pusher.clone(),
                clock.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                broadcaster.clone(),
                message_pusher.clone(),
                typing.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(broadcaster.clone(), typing.clone())),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                message_repository.clone(),
                broadcaster.clone(),
                typing.clone(),
                user_directory.clone(),
                clock.clone(),
            )),
            get_messages_usecase: Arc::new(GetMessagesUseCase::new(
                message_repository,
                user_directory.clone(),
                config.message_limit,
            )),
            typing_usecase: Arc::new(TypingUseCase::new(
                typing,
                broadcaster.clone(),
                user_directory.clone(),
                clock.clone(),
            )),
            add_expense_usecase: Arc::new(AddExpenseUseCase::new(
                expense_repository.clone(),
                broadcaster.clone(),
                user_directory.clone(),
                clock.clone(),
            )),
            delete_expense_usecase: Arc::new(DeleteExpenseUseCase::new(
                expense_repository.clone(),
                broadcaster.clone(),
            )),
            get_expenses_usecase: Arc::new(GetExpensesUseCase::new(
                expense_repository.clone(),
                user_directory.clone(),
            )),
            get_expense_summary_usecase: Arc::new(GetExpenseSummaryUseCase::new(
                expense_repository,
                settlement_repository.clone(),
                user_directory.clone(),
            )),
            settle_debt_usecase: Arc::new(SettleDebtUseCase::new(
                settlement_repository,
                broadcaster,
                user_directory,
                clock,
            )),
            message_pusher,
            registry,
            idle_timeout: config.idle_timeout,
            ping_interval: config.ping_interval,
        }
    }
}
