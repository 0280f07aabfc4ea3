//! UseCase: ルームへの参加・退出
//!
//! A connection is in at most one room. Joining another room leaves the previous
//! one, and leaving a room clears the user's typing indicator there.

use std::sync::Arc;

use crate::domain::{ConnectionId, JoinOutcome, RoomId, TypingTracker, UserId};

use super::{broadcast::RoomBroadcaster, typing::clear_typing_and_notify};

pub struct JoinRoomUseCase {
    broadcaster: Arc<RoomBroadcaster>,
    typing: Arc<TypingTracker>,
}

impl JoinRoomUseCase {
    pub fn new(broadcaster: Arc<RoomBroadcaster>, typing: Arc<TypingTracker>) -> Self {
        Self {
            broadcaster,
            typing,
        }
    }

    pub async fn join(
        &self,
        connection_id: &ConnectionId,
        user_id: &UserId,
        room_id: &RoomId,
    ) -> JoinOutcome {
        let outcome = self
            .broadcaster
            .registry()
            .join(connection_id, room_id)
            .await;

        if let Some(previous) = &outcome.left {
            clear_typing_and_notify(
                &self.typing,
                &self.broadcaster,
                previous,
                user_id,
                Some(connection_id),
            )
            .await;
        }

        tracing::info!(
            connection_id = %connection_id,
            user_id = %user_id,
            room_id = %room_id,
            newly_joined = outcome.newly_joined,
            "Joined chat"
        );
        outcome
    }

    /// Leave the room. Returns `false` when the connection was not in it.
    pub async fn leave(
        &self,
        connection_id: &ConnectionId,
        user_id: &UserId,
        room_id: &RoomId,
    ) -> bool {
        let left = self
            .broadcaster
            .registry()
            .leave(connection_id, room_id)
            .await;
        if left {
            clear_typing_and_notify(&self.typing, &self.broadcaster, room_id, user_id, None).await;
            tracing::info!(
                connection_id = %connection_id,
                user_id = %user_id,
                room_id = %room_id,
                "Left chat"
            );
        }
        left
    }
}
