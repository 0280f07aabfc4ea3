//! Room broadcasting
//!
//! Fans room events out to the current members of a room. A per-room lock lets a
//! use case persist a record and publish it as one step, so members see events
//! of one room in the order they were stored.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{ConnectionId, MessagePusher, RoomEvent, RoomEventEncoder, RoomId, RoomRegistry};

pub struct RoomBroadcaster {
    registry: Arc<RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    encoder: Arc<dyn RoomEventEncoder>,
    room_locks: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
}

impl RoomBroadcaster {
    pub fn new(
        registry: Arc<RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        encoder: Arc<dyn RoomEventEncoder>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            encoder,
            room_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Serialize store-and-publish sequences within one room.
    pub async fn lock_room(&self, room_id: &RoomId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.room_locks.lock().await;
            locks.entry(room_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Deliver the event to every member of the room except `exclude`.
    ///
    /// Fire-and-forget: delivery failures are logged and otherwise ignored.
    pub async fn publish(
        &self,
        room_id: &RoomId,
        exclude: Option<&ConnectionId>,
        event: RoomEvent<'_>,
    ) {
        let targets: Vec<ConnectionId> = self
            .registry
            .members(room_id)
            .await
            .into_iter()
            .filter(|id| Some(id) != exclude)
            .collect();
        if targets.is_empty() {
            return;
        }

        let frame = self.encoder.encode(event);
        if let Err(e) = self.message_pusher.broadcast(targets, &frame).await {
            tracing::warn!(room_id = %room_id, "Failed to broadcast to room: {}", e);
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }
}
