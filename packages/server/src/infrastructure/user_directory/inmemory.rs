//! InMemory UserDirectory 実装

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;

use crate::{
    domain::{DirectoryError, UserDirectory, UserId, UserProfile},
    infrastructure::dto::directory::UserProfileDto,
};

#[derive(Debug, Default, Clone)]
pub struct InMemoryUserDirectory {
    profiles: HashMap<UserId, UserProfile>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Load profiles from a JSON array of `{id, name, profilePicture?, verified?}`.
    ///
    /// Entries without a usable id are skipped with a warning.
    pub fn from_json_file(path: &Path) -> Result<Self, DirectoryError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DirectoryError::Unavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let records: Vec<UserProfileDto> = serde_json::from_str(&raw).map_err(|e| {
            DirectoryError::Unavailable(format!("invalid user file {}: {}", path.display(), e))
        })?;

        let mut profiles = Vec::with_capacity(records.len());
        for record in records {
            let Some(raw_id) = record.id.clone() else {
                tracing::warn!("Skipping user record without id: {:?}", record.name);
                continue;
            };
            match UserId::new(raw_id) {
                Ok(id) => profiles.push(record.into_profile(id)),
                Err(e) => tracing::warn!("Skipping user record with invalid id: {}", e),
            }
        }

        tracing::info!("Loaded {} user profiles from {}", profiles.len(), path.display());
        Ok(Self::from_profiles(profiles))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn lookup(&self, user_id: &UserId) -> Result<UserProfile, DirectoryError> {
        self.profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| DirectoryError::UserNotFound(user_id.to_string()))
    }
}
