//! UseCase: 入力中 (typing) 状態の更新
//!
//! Start and stop events are broadcast to the room excluding the acting
//! connection. Entries that are never stopped expire through [`TypingUseCase::sweep_expired`].

use std::sync::Arc;

use wayfare_shared::time::Clock;

use crate::domain::{
    ConnectionId, RoomEvent, RoomId, Timestamp, TypingTracker, UserDirectory, UserId,
    user_directory::resolve_or_unknown,
};

use super::{
    broadcast::RoomBroadcaster,
    error::{IdentityMismatch, TypingError},
};

/// Clear the user's typing entry and tell the rest of the room, if there was one.
pub(crate) async fn clear_typing_and_notify(
    typing: &TypingTracker,
    broadcaster: &RoomBroadcaster,
    room_id: &RoomId,
    user_id: &UserId,
    exclude: Option<&ConnectionId>,
) {
    if typing.clear_typing(room_id, user_id).await {
        broadcaster
            .publish(room_id, exclude, RoomEvent::UserStoppedTyping(user_id))
            .await;
    }
}

pub struct TypingUseCase {
    typing: Arc<TypingTracker>,
    broadcaster: Arc<RoomBroadcaster>,
    user_directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl TypingUseCase {
    pub fn new(
        typing: Arc<TypingTracker>,
        broadcaster: Arc<RoomBroadcaster>,
        user_directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            typing,
            broadcaster,
            user_directory,
            clock,
        }
    }

    /// Mark `actor` as typing in the room.
    ///
    /// Without a `username` the directory name is used.
    pub async fn start(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        actor: &UserId,
        claimed: Option<&UserId>,
        username: Option<&str>,
    ) -> Result<(), TypingError> {
        IdentityMismatch::check(claimed, actor)?;

        let display_name = match username.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => resolve_or_unknown(self.user_directory.as_ref(), actor).await.name,
        };

        let now = Timestamp::new(self.clock.now_millis());
        self.typing
            .set_typing(room_id, actor, &display_name, now)
            .await;
        self.broadcaster
            .publish(
                room_id,
                Some(connection_id),
                RoomEvent::UserTyping {
                    user_id: actor,
                    username: &display_name,
                },
            )
            .await;
        Ok(())
    }

    pub async fn stop(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        actor: &UserId,
        claimed: Option<&UserId>,
    ) -> Result<(), TypingError> {
        IdentityMismatch::check(claimed, actor)?;

        self.typing.clear_typing(room_id, actor).await;
        self.broadcaster
            .publish(
                room_id,
                Some(connection_id),
                RoomEvent::UserStoppedTyping(actor),
            )
            .await;
        Ok(())
    }

    /// Expire stale entries and notify their rooms. Returns how many expired.
    pub async fn sweep_expired(&self) -> usize {
        let now = Timestamp::new(self.clock.now_millis());
        let expired = self.typing.sweep(now).await;
        for entry in &expired {
            tracing::debug!(
                room_id = %entry.room_id,
                user_id = %entry.user_id,
                "Typing indicator expired"
            );
            self.broadcaster
                .publish(
                    &entry.room_id,
                    None,
                    RoomEvent::UserStoppedTyping(&entry.user_id),
                )
                .await;
        }
        expired.len()
    }
}
