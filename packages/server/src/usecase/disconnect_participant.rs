//! UseCase: 参加者切断処理
//!
//! Shared by explicit closes and idle timeouts: forget the outbound channel,
//! drop room membership and clear the user's typing indicator.

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, TypingTracker, UserId};

use super::{broadcast::RoomBroadcaster, typing::clear_typing_and_notify};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    broadcaster: Arc<RoomBroadcaster>,
    message_pusher: Arc<dyn MessagePusher>,
    typing: Arc<TypingTracker>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        broadcaster: Arc<RoomBroadcaster>,
        message_pusher: Arc<dyn MessagePusher>,
        typing: Arc<TypingTracker>,
    ) -> Self {
        Self {
            broadcaster,
            message_pusher,
            typing,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// The room the connection was in, if any
    pub async fn execute(&self, connection_id: &ConnectionId, user_id: &UserId) -> Option<RoomId> {
        self.message_pusher
            .unregister_connection(connection_id)
            .await;

        let room_id = self.broadcaster.registry().disconnect(connection_id).await;
        if let Some(room_id) = &room_id {
            clear_typing_and_notify(&self.typing, &self.broadcaster, room_id, user_id, None).await;
        }

        tracing::info!(
            connection_id = %connection_id,
            user_id = %user_id,
            room_id = room_id.as_ref().map(|r| r.as_str()),
            "Participant disconnected"
        );
        room_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::Timestamp,
        usecase::test_support::{Fixture, NOW, room},
    };

    #[tokio::test]
    async fn test_disconnect_cleans_up_everything() {
        // テスト項目: 切断時にメンバーシップと typing 状態が消え、残りの参加者に通知される
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = DisconnectParticipantUseCase::new(
            fixture.broadcaster.clone(),
            fixture.pusher.clone(),
            fixture.typing.clone(),
        );
        let alice = fixture.member("alice", "r1").await;
        let mut bob = fixture.member("bob", "r1").await;
        fixture
            .typing
            .set_typing(&room("r1"), &alice.user_id, "Alice", Timestamp::new(NOW))
            .await;

        // when (操作):
        let room_id = usecase.execute(&alice.connection_id, &alice.user_id).await;

        // then (期待する結果):
        assert_eq!(room_id, Some(room("r1")));
        assert_eq!(fixture.pusher.connection_count().await, 1);
        assert_eq!(
            fixture.registry.members(&room("r1")).await,
            vec![bob.connection_id.clone()]
        );
        assert!(
            fixture
                .typing
                .active_typers(&room("r1"), Timestamp::new(NOW))
                .await
                .is_empty()
        );
        assert_eq!(bob.frames()[0]["event"], "userStoppedTyping");
    }

    #[tokio::test]
    async fn test_disconnect_without_room_is_quiet() {
        // given:
        let fixture = Fixture::new();
        let usecase = DisconnectParticipantUseCase::new(
            fixture.broadcaster.clone(),
            fixture.pusher.clone(),
            fixture.typing.clone(),
        );
        let alice = fixture.member("alice", "r1").await;
        let mut bob = fixture.member("bob", "r1").await;

        // when: not typing, so nobody is notified
        usecase.execute(&alice.connection_id, &alice.user_id).await;

        // then:
        assert!(bob.frames().is_empty());
        assert_eq!(usecase.execute(&alice.connection_id, &alice.user_id).await, None);
    }
}
