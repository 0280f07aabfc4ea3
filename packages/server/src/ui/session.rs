//! Per-connection session state machine
//!
//! `connected -> joined(room) -> connected`, with the user bound at upgrade time.
//! Every room-scoped event is ignored unless the session has joined the room the
//! event names. Failures never close the connection; they only produce a failed
//! ack when the client asked for one.

use crate::{
    domain::{ConnectionId, ExpenseId, MessageId, RoomId, UserId, ValueObjectError},
    infrastructure::dto::websocket::{
        AckDto, AddExpensePayload, ClientEvent, ClientFrame, DeleteExpensePayload, ExpenseDto,
        ExpenseSummaryDto, FrameError, GetMessagesPayload, MessageDto, SendMessagePayload,
        SettleDebtPayload, SettlementDto, StoppedTypingPayload, TypingPayload, UserRef,
        encode_frame, event,
    },
    usecase::{AddExpenseCommand, ErrorKind, SendMessageCommand, SettleDebtCommand},
};

use super::state::AppState;

/// Ack code for room-scoped events received outside the addressed room
pub const NOT_JOINED: &str = "not_joined";
/// Ack code for event names the server does not know
pub const UNKNOWN_EVENT: &str = "unknown_event";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Joined(RoomId),
}

#[derive(Debug)]
pub struct Session {
    connection_id: ConnectionId,
    user_id: UserId,
    state: SessionState,
}

fn failure(kind: ErrorKind, error: impl ToString) -> AckDto {
    AckDto::failure(kind.code(), error.to_string())
}

fn invalid(error: ValueObjectError) -> AckDto {
    failure(ErrorKind::Validation, error)
}

fn user_id_of(user: Option<UserRef>) -> Result<Option<UserId>, ValueObjectError> {
    user.map(UserRef::into_user_id).transpose()
}

impl Session {
    pub fn new(connection_id: ConnectionId, user_id: UserId) -> Self {
        Self {
            connection_id,
            user_id,
            state: SessionState::Connected,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Handle one inbound text frame and return the ack frame to send back, if any.
    pub async fn handle_text(&mut self, app: &AppState, text: &str) -> Option<String> {
        let frame: ClientFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    "Ignoring unparseable frame: {}",
                    e
                );
                return None;
            }
        };
        let ack = frame.ack;

        let reply = match ClientEvent::parse(&frame.event, frame.data) {
            Ok(event) => self.dispatch(app, event).await,
            Err(FrameError::UnknownEvent(name)) => {
                tracing::warn!(connection_id = %self.connection_id, "Unknown event '{}'", name);
                AckDto::failure(UNKNOWN_EVENT, format!("unknown event '{name}'"))
            }
            Err(e) => {
                tracing::warn!(connection_id = %self.connection_id, "{}", e);
                failure(ErrorKind::Validation, e)
            }
        };

        ack.map(|id| encode_frame(event::ACK, Some(id), &reply))
    }

    async fn dispatch(&mut self, app: &AppState, event: ClientEvent) -> AckDto {
        let joined = self.joined_room(event.chat_id());

        match (event, joined) {
            (ClientEvent::JoinChat(chat_id), _) => self.join(app, chat_id).await,
            (event, None) => {
                tracing::debug!(
                    connection_id = %self.connection_id,
                    user_id = %self.user_id,
                    event = event.name(),
                    chat_id = event.chat_id(),
                    "Ignoring event outside the joined room"
                );
                AckDto::failure(NOT_JOINED, "join the chat before sending events to it")
            }
            (ClientEvent::LeaveChat(_), Some(room_id)) => self.leave(app, room_id).await,
            (ClientEvent::GetMessages(payload), Some(room_id)) => {
                self.get_messages(app, room_id, payload).await
            }
            (ClientEvent::SendMessage(payload), Some(room_id)) => {
                self.send_message(app, room_id, payload).await
            }
            (ClientEvent::Typing(payload), Some(room_id)) => {
                self.typing(app, room_id, payload).await
            }
            (ClientEvent::StoppedTyping(payload), Some(room_id)) => {
                self.stopped_typing(app, room_id, payload).await
            }
            (ClientEvent::GetExpenses(_), Some(room_id)) => self.get_expenses(app, room_id).await,
            (ClientEvent::AddExpense(payload), Some(room_id)) => {
                self.add_expense(app, room_id, payload).await
            }
            (ClientEvent::DeleteExpense(payload), Some(room_id)) => {
                self.delete_expense(app, room_id, payload).await
            }
            (ClientEvent::GetExpenseSummary(_), Some(room_id)) => {
                self.get_expense_summary(app, room_id).await
            }
            (ClientEvent::SettleDebt(payload), Some(room_id)) => {
                self.settle_debt(app, room_id, payload).await
            }
        }
    }

    /// The joined room, if `chat_id` names it
    fn joined_room(&self, chat_id: &str) -> Option<RoomId> {
        match &self.state {
            SessionState::Joined(room_id) if room_id.as_str() == chat_id.trim() => {
                Some(room_id.clone())
            }
            _ => None,
        }
    }

    async fn join(&mut self, app: &AppState, chat_id: String) -> AckDto {
        let room_id = match RoomId::new(chat_id) {
            Ok(room_id) => room_id,
            Err(e) => {
                tracing::debug!(connection_id = %self.connection_id, "Ignoring joinChat: {}", e);
                return invalid(e);
            }
        };

        app.join_room_usecase
            .join(&self.connection_id, &self.user_id, &room_id)
            .await;
        self.state = SessionState::Joined(room_id.clone());
        AckDto::Room {
            success: true,
            chat_id: room_id.into_string(),
        }
    }

    async fn leave(&mut self, app: &AppState, room_id: RoomId) -> AckDto {
        app.join_room_usecase
            .leave(&self.connection_id, &self.user_id, &room_id)
            .await;
        self.state = SessionState::Connected;
        AckDto::Room {
            success: true,
            chat_id: room_id.into_string(),
        }
    }

    async fn get_messages(
        &self,
        app: &AppState,
        room_id: RoomId,
        payload: GetMessagesPayload,
    ) -> AckDto {
        let before = match payload.before().map(|id| MessageId::new(id.to_string())) {
            Some(Ok(id)) => Some(id),
            Some(Err(e)) => return invalid(e),
            None => None,
        };

        match app
            .get_messages_usecase
            .execute(&room_id, payload.limit(), before)
            .await
        {
            Ok(posted) => AckDto::Messages {
                success: true,
                messages: posted.iter().map(MessageDto::from).collect(),
            },
            Err(e) => {
                tracing::warn!(room_id = %room_id, "getMessages failed: {}", e);
                failure(e.kind(), e)
            }
        }
    }

    async fn send_message(
        &self,
        app: &AppState,
        room_id: RoomId,
        payload: SendMessagePayload,
    ) -> AckDto {
        let claimed_sender = match user_id_of(payload.sender) {
            Ok(sender) => sender,
            Err(e) => return invalid(e),
        };
        let command = SendMessageCommand {
            connection_id: self.connection_id.clone(),
            room_id,
            actor: self.user_id.clone(),
            claimed_sender,
            content: payload.content,
            timestamp: payload.timestamp.and_then(|t| t.to_millis()),
        };

        match app.send_message_usecase.execute(command).await {
            Ok(posted) => AckDto::Message {
                success: true,
                message: MessageDto::from(&posted),
            },
            Err(e) => {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    user_id = %self.user_id,
                    "sendMessage rejected: {}",
                    e
                );
                failure(e.kind(), e)
            }
        }
    }

    async fn typing(&self, app: &AppState, room_id: RoomId, payload: TypingPayload) -> AckDto {
        let claimed = match user_id_of(payload.user_id) {
            Ok(claimed) => claimed,
            Err(e) => return invalid(e),
        };

        match app
            .typing_usecase
            .start(
                &self.connection_id,
                &room_id,
                &self.user_id,
                claimed.as_ref(),
                payload.username.as_deref(),
            )
            .await
        {
            Ok(()) => AckDto::done(),
            Err(e) => failure(e.kind(), e),
        }
    }

    async fn stopped_typing(
        &self,
        app: &AppState,
        room_id: RoomId,
        payload: StoppedTypingPayload,
    ) -> AckDto {
        let claimed = match user_id_of(payload.user_id) {
            Ok(claimed) => claimed,
            Err(e) => return invalid(e),
        };

        match app
            .typing_usecase
            .stop(&self.connection_id, &room_id, &self.user_id, claimed.as_ref())
            .await
        {
            Ok(()) => AckDto::done(),
            Err(e) => failure(e.kind(), e),
        }
    }

    async fn get_expenses(&self, app: &AppState, room_id: RoomId) -> AckDto {
        match app.get_expenses_usecase.execute(&room_id).await {
            Ok(recorded) => AckDto::Expenses {
                success: true,
                expenses: recorded.iter().map(ExpenseDto::from).collect(),
            },
            Err(e) => {
                tracing::warn!(room_id = %room_id, "getExpenses failed: {}", e);
                failure(e.kind(), e)
            }
        }
    }

    async fn add_expense(
        &self,
        app: &AppState,
        room_id: RoomId,
        payload: AddExpensePayload,
    ) -> AckDto {
        let paid_by = match user_id_of(payload.paid_by) {
            Ok(paid_by) => paid_by,
            Err(e) => return invalid(e),
        };
        let split_between = match payload
            .split_between
            .into_iter()
            .map(UserRef::into_user_id)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(ids) => ids,
            Err(e) => return invalid(e),
        };
        let command = AddExpenseCommand {
            room_id,
            actor: self.user_id.clone(),
            description: payload.description,
            amount: payload.amount,
            paid_by,
            split_between,
            category: payload.category,
            timestamp: payload.timestamp.and_then(|t| t.to_millis()),
        };

        match app.add_expense_usecase.execute(command).await {
            Ok(recorded) => AckDto::Expense {
                success: true,
                expense: ExpenseDto::from(&recorded),
            },
            Err(e) => {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    user_id = %self.user_id,
                    "addExpense rejected: {}",
                    e
                );
                failure(e.kind(), e)
            }
        }
    }

    async fn delete_expense(
        &self,
        app: &AppState,
        room_id: RoomId,
        payload: DeleteExpensePayload,
    ) -> AckDto {
        let expense_id = match ExpenseId::new(payload.expense_id) {
            Ok(id) => id,
            Err(e) => return invalid(e),
        };

        match app
            .delete_expense_usecase
            .execute(&room_id, &expense_id, &self.user_id)
            .await
        {
            Ok(deleted) => AckDto::ExpenseDeleted {
                success: true,
                expense_id: deleted.into_string(),
            },
            Err(e) => failure(e.kind(), e),
        }
    }

    async fn get_expense_summary(&self, app: &AppState, room_id: RoomId) -> AckDto {
        match app.get_expense_summary_usecase.execute(&room_id).await {
            Ok(report) => AckDto::Summary {
                success: true,
                summary: ExpenseSummaryDto::from_report(&report, Some(&self.user_id)),
            },
            Err(e) => {
                tracing::warn!(room_id = %room_id, "getExpenseSummary failed: {}", e);
                failure(e.kind(), e)
            }
        }
    }

    async fn settle_debt(
        &self,
        app: &AppState,
        room_id: RoomId,
        payload: SettleDebtPayload,
    ) -> AckDto {
        let (from, to) = match (payload.from.into_user_id(), payload.to.into_user_id()) {
            (Ok(from), Ok(to)) => (from, to),
            (Err(e), _) | (_, Err(e)) => return invalid(e),
        };
        let command = SettleDebtCommand {
            room_id,
            actor: self.user_id.clone(),
            from,
            to,
            amount: payload.amount,
        };

        match app.settle_debt_usecase.execute(command).await {
            Ok(recorded) => AckDto::Settlement {
                success: true,
                settlement: SettlementDto::from(&recorded),
            },
            Err(e) => failure(e.kind(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ServerConfig,
        domain::UserProfile,
        infrastructure::user_directory::InMemoryUserDirectory,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use wayfare_shared::time::FixedClock;

    struct Client {
        session: Session,
        rx: mpsc::UnboundedReceiver<String>,
    }

    impl Client {
        async fn send(&mut self, app: &AppState, frame: Value) -> Option<Value> {
            self.session
                .handle_text(app, &frame.to_string())
                .await
                .map(|ack| serde_json::from_str(&ack).unwrap())
        }

        fn events(&mut self) -> Vec<String> {
            let mut events = Vec::new();
            while let Ok(frame) = self.rx.try_recv() {
                let value: Value = serde_json::from_str(&frame).unwrap();
                events.push(value["event"].as_str().unwrap().to_string());
            }
            events
        }
    }

    fn app() -> AppState {
        let directory = InMemoryUserDirectory::from_profiles(
            [("alice", "Alice"), ("bob", "Bob")].map(|(id, name)| UserProfile {
                id: UserId::new(id.to_string()).unwrap(),
                name: name.to_string(),
                profile_picture: None,
                verified: false,
            }),
        );
        AppState::in_memory(
            &ServerConfig::default(),
            Arc::new(directory),
            Arc::new(FixedClock::new(1_700_000_000_000)),
        )
    }

    async fn connect(app: &AppState, user: &str) -> Client {
        let connection_id = ConnectionId::generate();
        let user_id = UserId::new(user.to_string()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        app.connect_participant_usecase
            .execute(connection_id.clone(), &user_id, tx)
            .await;
        Client {
            session: Session::new(connection_id, user_id),
            rx,
        }
    }

    #[tokio::test]
    async fn test_events_before_join_are_ignored() {
        // given:
        let app = app();
        let mut alice = connect(&app, "alice").await;

        // when:
        let silent = alice
            .send(&app, json!({"event": "sendMessage", "data": {"chatId": "v1", "content": "hi"}}))
            .await;
        let acked = alice
            .send(&app, json!({"event": "getExpenses", "data": "v1", "ack": 1}))
            .await
            .unwrap();

        // then:
        assert!(silent.is_none());
        assert_eq!(acked["data"]["success"], false);
        assert_eq!(acked["data"]["code"], NOT_JOINED);
        assert_eq!(alice.session.state(), &SessionState::Connected);
        assert!(alice.events().is_empty());
    }

    #[tokio::test]
    async fn test_join_then_send_message() {
        // given:
        let app = app();
        let mut alice = connect(&app, "alice").await;
        let mut bob = connect(&app, "bob").await;
        alice.send(&app, json!({"event": "joinChat", "data": "v1"})).await;
        bob.send(&app, json!({"event": "joinChat", "data": "v1"})).await;

        // when:
        let ack = alice
            .send(
                &app,
                json!({
                    "event": "sendMessage",
                    "data": {"chatId": "v1", "content": "Hello", "sender": {"_id": "alice"}},
                    "ack": 7
                }),
            )
            .await
            .unwrap();

        // then:
        assert_eq!(ack["event"], "ack");
        assert_eq!(ack["ack"], 7);
        assert_eq!(ack["data"]["success"], true);
        assert_eq!(ack["data"]["message"]["senderName"], "Alice");
        assert_eq!(alice.events(), vec!["receiveMessage"]);
        assert_eq!(bob.events(), vec!["receiveMessage"]);
    }

    #[tokio::test]
    async fn test_join_with_blank_room_is_noop() {
        // given:
        let app = app();
        let mut alice = connect(&app, "alice").await;

        // when:
        let ack = alice
            .send(&app, json!({"event": "joinChat", "data": "  ", "ack": 1}))
            .await
            .unwrap();

        // then:
        assert_eq!(ack["data"]["code"], "validation");
        assert_eq!(alice.session.state(), &SessionState::Connected);
        assert_eq!(app.registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_event_for_other_room_is_ignored() {
        // given:
        let app = app();
        let mut alice = connect(&app, "alice").await;
        alice.send(&app, json!({"event": "joinChat", "data": "v1"})).await;

        // when:
        let ack = alice
            .send(&app, json!({"event": "getMessages", "data": "v2", "ack": 2}))
            .await
            .unwrap();

        // then:
        assert_eq!(ack["data"]["code"], NOT_JOINED);
    }

    #[tokio::test]
    async fn test_spoofed_sender_is_rejected() {
        // given:
        let app = app();
        let mut alice = connect(&app, "alice").await;
        alice.send(&app, json!({"event": "joinChat", "data": "v1"})).await;

        // when:
        let ack = alice
            .send(
                &app,
                json!({
                    "event": "sendMessage",
                    "data": {"chatId": "v1", "content": "hi", "sender": "bob"},
                    "ack": 3
                }),
            )
            .await
            .unwrap();

        // then:
        assert_eq!(ack["data"]["success"], false);
        assert_eq!(ack["data"]["code"], "authorization");
        assert!(alice.events().is_empty());
    }

    #[tokio::test]
    async fn test_only_payer_can_delete_expense() {
        // given:
        let app = app();
        let mut alice = connect(&app, "alice").await;
        let mut bob = connect(&app, "bob").await;
        alice.send(&app, json!({"event": "joinChat", "data": "v1"})).await;
        bob.send(&app, json!({"event": "joinChat", "data": "v1"})).await;
        let added = alice
            .send(
                &app,
                json!({
                    "event": "addExpense",
                    "data": {
                        "chatId": "v1",
                        "description": "Taxi",
                        "amount": 18.5,
                        "paidBy": "alice",
                        "splitBetween": ["alice", {"_id": "bob"}],
                        "category": "transport"
                    },
                    "ack": 1
                }),
            )
            .await
            .unwrap();
        let expense_id = added["data"]["expense"]["_id"].as_str().unwrap().to_string();
        alice.events();
        bob.events();

        // when:
        let denied = bob
            .send(
                &app,
                json!({
                    "event": "deleteExpense",
                    "data": {"chatId": "v1", "expenseId": expense_id},
                    "ack": 2
                }),
            )
            .await
            .unwrap();
        let listed = bob
            .send(&app, json!({"event": "getExpenses", "data": "v1", "ack": 3}))
            .await
            .unwrap();

        // then:
        assert_eq!(denied["data"]["code"], "authorization");
        assert_eq!(listed["data"]["expenses"].as_array().unwrap().len(), 1);
        assert!(alice.events().is_empty());

        // and the payer can
        let deleted = alice
            .send(
                &app,
                json!({
                    "event": "deleteExpense",
                    "data": {"chatId": "v1", "expenseId": expense_id},
                    "ack": 4
                }),
            )
            .await
            .unwrap();
        assert_eq!(deleted["data"]["success"], true);
        assert_eq!(bob.events(), vec!["expenseDeleted"]);
    }

    #[tokio::test]
    async fn test_summary_names_requester_you() {
        // given:
        let app = app();
        let mut alice = connect(&app, "alice").await;
        alice.send(&app, json!({"event": "joinChat", "data": "v1"})).await;
        alice
            .send(
                &app,
                json!({
                    "event": "addExpense",
                    "data": {
                        "chatId": "v1",
                        "description": "Dinner",
                        "amount": 30,
                        "paidBy": "alice",
                        "splitBetween": ["alice", "bob", "carol"]
                    }
                }),
            )
            .await;

        // when:
        let ack = alice
            .send(&app, json!({"event": "getExpenseSummary", "data": "v1", "ack": 9}))
            .await
            .unwrap();

        // then:
        let summary = &ack["data"]["summary"];
        assert_eq!(summary["totalExpenses"], 1);
        assert_eq!(summary["totalAmount"], 30.0);
        assert_eq!(summary["balances"][0]["name"], "You");
        assert_eq!(summary["balances"][0]["amount"], 20.0);
        assert_eq!(summary["balances"][2]["name"], "Unknown User");
        assert_eq!(summary["settlements"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_leave_returns_to_connected() {
        // given:
        let app = app();
        let mut alice = connect(&app, "alice").await;
        alice.send(&app, json!({"event": "joinChat", "data": "v1"})).await;

        // when:
        let ack = alice
            .send(&app, json!({"event": "leaveChat", "data": "v1", "ack": 1}))
            .await
            .unwrap();

        // then:
        assert_eq!(ack["data"]["success"], true);
        assert_eq!(alice.session.state(), &SessionState::Connected);
        assert!(app.registry.members(&RoomId::new("v1".to_string()).unwrap()).await.is_empty());
    }

    #[tokio::test]
    async fn test_garbage_and_unknown_events() {
        // given:
        let app = app();
        let mut alice = connect(&app, "alice").await;

        // when:
        let garbage = alice.session.handle_text(&app, "not json").await;
        let unknown = alice
            .send(&app, json!({"event": "dance", "data": {}, "ack": 5}))
            .await
            .unwrap();

        // then:
        assert!(garbage.is_none());
        assert_eq!(unknown["data"]["code"], UNKNOWN_EVENT);
    }
}
