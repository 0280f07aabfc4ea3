//! User directory records.

use serde::Deserialize;

use crate::domain::{UserId, UserProfile};

/// A user as returned by the directory API or stored in a users file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

impl UserProfileDto {
    /// Convert into a profile for `id`, falling back to the unknown label for a missing name.
    pub fn into_profile(self, id: UserId) -> UserProfile {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UserProfile::UNKNOWN_NAME.to_string());
        UserProfile {
            id,
            name,
            profile_picture: self.profile_picture,
            verified: self.verified,
        }
    }
}
