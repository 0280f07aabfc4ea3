//! User directory collaborator
//!
//! Resolves user ids to display data for broadcast payloads.

use async_trait::async_trait;

use super::{DirectoryError, UserId, UserProfile};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup(&self, user_id: &UserId) -> Result<UserProfile, DirectoryError>;
}

/// Resolve a profile, substituting the "Unknown User" placeholder on any failure.
pub async fn resolve_or_unknown(directory: &dyn UserDirectory, user_id: &UserId) -> UserProfile {
    match directory.lookup(user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::debug!(user_id = %user_id, "User lookup failed, using fallback: {}", e);
            UserProfile::unknown(user_id.clone())
        }
    }
}

/// Resolve several profiles in input order, each falling back independently.
pub async fn resolve_all_or_unknown(
    directory: &dyn UserDirectory,
    user_ids: &[UserId],
) -> Vec<UserProfile> {
    let mut profiles = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        profiles.push(resolve_or_unknown(directory, user_id).await);
    }
    profiles
}
