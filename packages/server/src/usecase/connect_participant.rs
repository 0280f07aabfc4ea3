//! UseCase: 参加者接続処理
//!
//! Registers a freshly upgraded connection's outbound channel. Room membership
//! starts later with `joinChat`.

use std::sync::Arc;

use wayfare_shared::time::Clock;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel, Timestamp, UserId};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            message_pusher,
            clock,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Returns
    ///
    /// The connection time
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        user_id: &UserId,
        sender: PusherChannel,
    ) -> Timestamp {
        let connected_at = Timestamp::new(self.clock.now_millis());
        tracing::info!(
            connection_id = %connection_id,
            user_id = %user_id,
            "Participant connected"
        );
        self.message_pusher
            .register_connection(connection_id, sender)
            .await;
        connected_at
    }
}
