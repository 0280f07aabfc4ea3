//! InMemory Message Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, MessageId, MessageRepository, RepositoryError, RoomId};

/// インメモリ Message Repository 実装
///
/// Each room's log is kept sorted by timestamp; messages with equal timestamps stay
/// in insertion order.
#[derive(Default)]
pub struct InMemoryMessageRepository {
    rooms: Mutex<HashMap<RoomId, Vec<ChatMessage>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored messages in a room
    pub async fn count(&self, room_id: &RoomId) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, message: ChatMessage) -> Result<ChatMessage, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let log = rooms.entry(message.room_id.clone()).or_default();

        // after every message with an equal or earlier timestamp
        let position = log.partition_point(|m| m.timestamp <= message.timestamp);
        log.insert(position, message.clone());

        Ok(message)
    }

    async fn list(
        &self,
        room_id: &RoomId,
        limit: usize,
        before: Option<MessageId>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        let Some(log) = rooms.get(room_id) else {
            return match before {
                Some(cursor) => Err(RepositoryError::MessageNotFound(cursor.into_string())),
                None => Ok(Vec::new()),
            };
        };

        let end = match before {
            Some(cursor) => log
                .iter()
                .position(|m| m.id == cursor)
                .ok_or_else(|| RepositoryError::MessageNotFound(cursor.into_string()))?,
            None => log.len(),
        };
        let start = end.saturating_sub(limit);

        Ok(log[start..end].to_vec())
    }
}
