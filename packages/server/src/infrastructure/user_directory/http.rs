//! HTTP UserDirectory 実装
//!
//! Calls `GET {base_url}/users/{id}` on the surrounding application. The id is
//! always sent as one percent-encoded path segment.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use crate::{
    domain::{DirectoryError, UserDirectory, UserId, UserProfile},
    infrastructure::dto::directory::UserProfileDto,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

pub struct HttpUserDirectory {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpUserDirectory {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DirectoryError> {
        let base_url = Url::parse(&base_url.into())
            .map_err(|e| DirectoryError::Unavailable(format!("invalid base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DirectoryError::Unavailable(format!("invalid base url: {base_url}")));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// `None` for ids that cannot name a single path segment.
    fn user_url(&self, user_id: &UserId) -> Option<Url> {
        // `.` and `..` are dropped by segment pushing instead of being encoded
        if matches!(user_id.as_str(), "." | "..") {
            return None;
        }
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push("users")
            .push(user_id.as_str());
        Some(url)
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn lookup(&self, user_id: &UserId) -> Result<UserProfile, DirectoryError> {
        let Some(url) = self.user_url(user_id) else {
            return Err(DirectoryError::UserNotFound(user_id.to_string()));
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(DirectoryError::UserNotFound(user_id.to_string())),
            status if status.is_success() => {
                let dto: UserProfileDto = response
                    .json()
                    .await
                    .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
                Ok(dto.into_profile(user_id.clone()))
            }
            status => Err(DirectoryError::Unavailable(format!(
                "user directory returned {}",
                status
            ))),
        }
    }
}
