//! Typing tracker
//!
//! Ephemeral per-room "who is typing" state. Entries expire `ttl` after their last
//! refresh even if no explicit stop arrives; a background sweep calls [`TypingTracker::sweep`].
//! Callers pass `now` explicitly so expiry is testable without sleeping.

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::{RoomId, Timestamp, UserId};

/// Default lifetime of a typing entry without refresh
pub const DEFAULT_TYPING_TTL_MS: i64 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingEntry {
    pub user_id: UserId,
    pub display_name: String,
    pub refreshed_at: Timestamp,
}

/// Entry removed by a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredTyping {
    pub room_id: RoomId,
    pub user_id: UserId,
}

#[derive(Debug)]
pub struct TypingTracker {
    ttl_ms: i64,
    rooms: Mutex<HashMap<RoomId, Vec<TypingEntry>>>,
}

impl TypingTracker {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            ttl_ms,
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Mark the user as typing, refreshing an existing entry in place.
    pub async fn set_typing(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        display_name: &str,
        now: Timestamp,
    ) {
        let mut rooms = self.rooms.lock().await;
        let entries = rooms.entry(room_id.clone()).or_default();
        match entries.iter_mut().find(|e| &e.user_id == user_id) {
            Some(entry) => {
                entry.display_name = display_name.to_string();
                entry.refreshed_at = now;
            }
            None => entries.push(TypingEntry {
                user_id: user_id.clone(),
                display_name: display_name.to_string(),
                refreshed_at: now,
            }),
        }
    }

    /// Remove the entry immediately. Returns whether one existed.
    pub async fn clear_typing(&self, room_id: &RoomId, user_id: &UserId) -> bool {
        let mut rooms = self.rooms.lock().await;
        let Some(entries) = rooms.get_mut(room_id) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|e| &e.user_id != user_id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            rooms.remove(room_id);
        }
        removed
    }

    /// Users currently typing in the room; stale entries are never reported.
    pub async fn active_typers(&self, room_id: &RoomId, now: Timestamp) -> Vec<TypingEntry> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| !self.is_expired(e, now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop every entry older than the ttl and report what was removed.
    pub async fn sweep(&self, now: Timestamp) -> Vec<ExpiredTyping> {
        let mut rooms = self.rooms.lock().await;
        let mut expired = Vec::new();

        for (room_id, entries) in rooms.iter_mut() {
            entries.retain(|e| {
                if self.is_expired(e, now) {
                    expired.push(ExpiredTyping {
                        room_id: room_id.clone(),
                        user_id: e.user_id.clone(),
                    });
                    false
                } else {
                    true
                }
            });
        }
        rooms.retain(|_, entries| !entries.is_empty());

        expired
    }

    fn is_expired(&self, entry: &TypingEntry, now: Timestamp) -> bool {
        now.value() - entry.refreshed_at.value() > self.ttl_ms
    }
}

impl Default for TypingTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_TTL_MS)
    }
}
