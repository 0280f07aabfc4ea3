//! UseCase: メッセージ履歴の取得

use std::sync::Arc;

use crate::domain::{
    MessageId, MessageRepository, PostedMessage, ProfileBook, RoomId, UserDirectory,
    user_directory::resolve_or_unknown,
};

use super::error::QueryError;

/// Largest page a client may request
pub const MAX_MESSAGE_PAGE: usize = 500;

pub struct GetMessagesUseCase {
    repository: Arc<dyn MessageRepository>,
    user_directory: Arc<dyn UserDirectory>,
    default_limit: usize,
}

impl GetMessagesUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        user_directory: Arc<dyn UserDirectory>,
        default_limit: usize,
    ) -> Self {
        Self {
            repository,
            user_directory,
            default_limit,
        }
    }

    /// The most recent `limit` messages (before `before`, if given), oldest first.
    pub async fn execute(
        &self,
        room_id: &RoomId,
        limit: Option<usize>,
        before: Option<MessageId>,
    ) -> Result<Vec<PostedMessage>, QueryError> {
        let limit = limit.unwrap_or(self.default_limit).min(MAX_MESSAGE_PAGE);
        let messages = self.repository.list(room_id, limit, before).await?;

        let mut profiles = ProfileBook::new();
        let mut posted = Vec::with_capacity(messages.len());
        for message in messages {
            let sender = match profiles.get(&message.sender) {
                Some(profile) => profile.clone(),
                None => {
                    let profile =
                        resolve_or_unknown(self.user_directory.as_ref(), &message.sender).await;
                    profiles.insert(profile.clone());
                    profile
                }
            };
            posted.push(PostedMessage { message, sender });
        }
        Ok(posted)
    }
}
