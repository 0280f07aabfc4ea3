//! Shared fixtures for use-case tests.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use wayfare_shared::time::FixedClock;

use crate::{
    domain::{ConnectionId, MessagePusher, RoomId, RoomRegistry, TypingTracker, UserId, UserProfile},
    infrastructure::{
        dto::encoder::JsonRoomEventEncoder,
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryExpenseRepository, InMemoryMessageRepository, InMemorySettlementRepository,
        },
        user_directory::InMemoryUserDirectory,
    },
};

use super::broadcast::RoomBroadcaster;

pub const NOW: i64 = 1_700_000_000_000;

pub fn uid(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub fn room(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

pub struct Fixture {
    pub registry: Arc<RoomRegistry>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub broadcaster: Arc<RoomBroadcaster>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub expenses: Arc<InMemoryExpenseRepository>,
    pub settlements: Arc<InMemorySettlementRepository>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub typing: Arc<TypingTracker>,
    pub clock: Arc<FixedClock>,
}

/// A connected test client and its outbound frames
pub struct Member {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub rx: mpsc::UnboundedReceiver<String>,
}

impl Member {
    /// Drain every frame received so far.
    pub fn frames(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }
}

impl Fixture {
    pub fn new() -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let broadcaster = Arc::new(RoomBroadcaster::new(
            registry.clone(),
            pusher.clone(),
            Arc::new(JsonRoomEventEncoder),
        ));
        let directory = Arc::new(InMemoryUserDirectory::from_profiles(
            [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")].map(|(id, name)| {
                UserProfile {
                    id: uid(id),
                    name: name.to_string(),
                    profile_picture: None,
                    verified: true,
                }
            }),
        ));

        Self {
            registry,
            pusher,
            broadcaster,
            messages: Arc::new(InMemoryMessageRepository::new()),
            expenses: Arc::new(InMemoryExpenseRepository::new()),
            settlements: Arc::new(InMemorySettlementRepository::new()),
            directory,
            typing: Arc::new(TypingTracker::default()),
            clock: Arc::new(FixedClock::new(NOW)),
        }
    }

    /// Connect `user` and join `room_id`.
    pub async fn member(&self, user: &str, room_id: &str) -> Member {
        let connection_id = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        self.pusher
            .register_connection(connection_id.clone(), tx)
            .await;
        self.registry.join(&connection_id, &room(room_id)).await;
        Member {
            connection_id,
            user_id: uid(user),
            rx,
        }
    }
}
