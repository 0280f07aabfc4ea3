//! UseCase: メッセージ送信処理
//!
//! Validate, append to the room's log, then broadcast `receiveMessage` to every
//! member including the sender. Sending implicitly clears the sender's typing state.

use std::sync::Arc;

use wayfare_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, MessageContent, MessageRepository, PostedMessage, RoomEvent,
    RoomId, Timestamp, TypingTracker, UserDirectory, UserId, user_directory::resolve_or_unknown,
};

use super::{
    broadcast::RoomBroadcaster,
    error::{IdentityMismatch, SendMessageError},
    typing::clear_typing_and_notify,
};

/// Input of [`SendMessageUseCase::execute`]
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub connection_id: ConnectionId,
    pub room_id: RoomId,
    /// User bound to the connection
    pub actor: UserId,
    /// `sender` field of the payload, if present
    pub claimed_sender: Option<UserId>,
    pub content: String,
    /// Client-supplied timestamp; receipt time when absent
    pub timestamp: Option<i64>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn MessageRepository>,
    broadcaster: Arc<RoomBroadcaster>,
    typing: Arc<TypingTracker>,
    user_directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        broadcaster: Arc<RoomBroadcaster>,
        typing: Arc<TypingTracker>,
        user_directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            broadcaster,
            typing,
            user_directory,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(PostedMessage)` - the stored message with the sender's profile
    /// * `Err(SendMessageError)` - nothing was stored or broadcast
    pub async fn execute(
        &self,
        command: SendMessageCommand,
    ) -> Result<PostedMessage, SendMessageError> {
        IdentityMismatch::check(command.claimed_sender.as_ref(), &command.actor)?;
        let content = MessageContent::new(command.content)?;
        let timestamp = Timestamp::new(
            command
                .timestamp
                .unwrap_or_else(|| self.clock.now_millis()),
        );

        let sender = resolve_or_unknown(self.user_directory.as_ref(), &command.actor).await;
        let message = ChatMessage::new(command.room_id.clone(), command.actor, content, timestamp);

        let posted = {
            let _guard = self.broadcaster.lock_room(&command.room_id).await;
            let message = self.repository.append(message).await?;
            let posted = PostedMessage { message, sender };
            self.broadcaster
                .publish(&command.room_id, None, RoomEvent::MessagePosted(&posted))
                .await;
            posted
        };

        clear_typing_and_notify(
            &self.typing,
            &self.broadcaster,
            &command.room_id,
            &posted.message.sender,
            Some(&command.connection_id),
        )
        .await;

        tracing::debug!(
            room_id = %command.room_id,
            user_id = %posted.message.sender,
            message_id = %posted.message.id,
            "Message sent"
        );
        Ok(posted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RepositoryError, ValueObjectError, repository::MockMessageRepository},
        usecase::test_support::{Fixture, Member, NOW, room, uid},
    };

    fn usecase(fixture: &Fixture) -> SendMessageUseCase {
        SendMessageUseCase::new(
            fixture.messages.clone(),
            fixture.broadcaster.clone(),
            fixture.typing.clone(),
            fixture.directory.clone(),
            fixture.clock.clone(),
        )
    }

    fn command(member: &Member, room_id: &str, content: &str) -> SendMessageCommand {
        SendMessageCommand {
            connection_id: member.connection_id.clone(),
            room_id: room(room_id),
            actor: member.user_id.clone(),
            claimed_sender: None,
            content: content.to_string(),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_send_message_broadcasts_to_room_including_sender() {
        // テスト項目: ルームの全員（送信者を含む）に receiveMessage が届く
        // given (前提条件):
        let fixture = Fixture::new();
        let mut alice = fixture.member("alice", "r1").await;
        let mut bob = fixture.member("bob", "r1").await;
        let mut carol = fixture.member("carol", "r2").await;

        // when (操作):
        let posted = usecase(&fixture)
            .execute(command(&alice, "r1", "Hello!"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(posted.message.timestamp, Timestamp::new(NOW));
        assert_eq!(posted.sender.name, "Alice");
        for frames in [alice.frames(), bob.frames()] {
            assert_eq!(frames.len(), 1);
            assert_eq!(frames[0]["event"], "receiveMessage");
            assert_eq!(frames[0]["data"]["content"], "Hello!");
            assert_eq!(frames[0]["data"]["senderName"], "Alice");
        }
        assert!(carol.frames().is_empty());
        assert_eq!(fixture.messages.count(&room("r1")).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_sender_gets_fallback_name() {
        // given:
        let fixture = Fixture::new();
        let mut dave = fixture.member("dave", "r1").await;

        // when:
        let posted = usecase(&fixture)
            .execute(command(&dave, "r1", "hi"))
            .await
            .unwrap();

        // then:
        assert_eq!(posted.sender.name, "Unknown User");
        assert_eq!(dave.frames()[0]["data"]["senderName"], "Unknown User");
    }

    #[tokio::test]
    async fn test_whitespace_content_is_rejected() {
        // given:
        let fixture = Fixture::new();
        let mut alice = fixture.member("alice", "r1").await;

        // when:
        let result = usecase(&fixture)
            .execute(command(&alice, "r1", "   "))
            .await;

        // then:
        assert_eq!(
            result,
            Err(SendMessageError::InvalidInput(ValueObjectError::EmptyMessage))
        );
        assert!(alice.frames().is_empty());
        assert_eq!(fixture.messages.count(&room("r1")).await, 0);
    }

    #[tokio::test]
    async fn test_spoofed_sender_is_rejected() {
        // given:
        let fixture = Fixture::new();
        let alice = fixture.member("alice", "r1").await;
        let mut cmd = command(&alice, "r1", "I am Bob");
        cmd.claimed_sender = Some(uid("bob"));

        // when:
        let result = usecase(&fixture).execute(cmd).await;

        // then:
        assert!(matches!(result, Err(SendMessageError::IdentityMismatch(_))));
        assert_eq!(fixture.messages.count(&room("r1")).await, 0);
    }

    #[tokio::test]
    async fn test_client_timestamp_is_kept() {
        // given:
        let fixture = Fixture::new();
        let alice = fixture.member("alice", "r1").await;
        let mut cmd = command(&alice, "r1", "earlier");
        cmd.timestamp = Some(1_000);

        // when:
        let posted = usecase(&fixture).execute(cmd).await.unwrap();

        // then:
        assert_eq!(posted.message.timestamp, Timestamp::new(1_000));
    }

    #[tokio::test]
    async fn test_send_clears_sender_typing() {
        // given:
        let fixture = Fixture::new();
        let alice = fixture.member("alice", "r1").await;
        let mut bob = fixture.member("bob", "r1").await;
        fixture
            .typing
            .set_typing(&room("r1"), &alice.user_id, "Alice", Timestamp::new(NOW))
            .await;

        // when:
        usecase(&fixture)
            .execute(command(&alice, "r1", "done typing"))
            .await
            .unwrap();

        // then: message first, then the stop notice
        let events: Vec<_> = bob
            .frames()
            .into_iter()
            .map(|f| f["event"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(events, vec!["receiveMessage", "userStoppedTyping"]);
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported_without_broadcast() {
        // given:
        let fixture = Fixture::new();
        let mut alice = fixture.member("alice", "r1").await;
        let mut repository = MockMessageRepository::new();
        repository
            .expect_append()
            .returning(|_| Err(RepositoryError::Unavailable("disk full".to_string())));
        let usecase = SendMessageUseCase::new(
            Arc::new(repository),
            fixture.broadcaster.clone(),
            fixture.typing.clone(),
            fixture.directory.clone(),
            fixture.clock.clone(),
        );

        // when:
        let result = usecase.execute(command(&alice, "r1", "hello")).await;

        // then:
        assert_eq!(
            result.unwrap_err().kind(),
            crate::usecase::error::ErrorKind::Unavailable
        );
        assert!(alice.frames().is_empty());
    }
}
