//! Room registry
//!
//! Process-local membership bookkeeping: which live connection is in which room.
//! A connection is in at most one room at a time. Nothing here is persisted; clients
//! re-join after a restart. Membership is not shared across processes, so running
//! more than one instance needs a shared pub/sub layer in front of broadcasting.

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use super::{ConnectionId, RoomId};

#[derive(Debug, Default)]
struct RegistryState {
    members: HashMap<RoomId, HashSet<ConnectionId>>,
    rooms_by_connection: HashMap<ConnectionId, RoomId>,
}

impl RegistryState {
    fn remove_member(&mut self, connection_id: &ConnectionId, room_id: &RoomId) {
        if let Some(set) = self.members.get_mut(room_id) {
            set.remove(connection_id);
            if set.is_empty() {
                self.members.remove(room_id);
            }
        }
    }
}

/// Result of a join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Room the connection was implicitly removed from, if any
    pub left: Option<RoomId>,
    /// `false` when the connection was already in this room
    pub newly_joined: bool,
}

#[derive(Debug, Default)]
pub struct RoomRegistry {
    state: Mutex<RegistryState>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the connection to the room, leaving any other room first.
    ///
    /// Joining the room the connection is already in changes nothing.
    pub async fn join(&self, connection_id: &ConnectionId, room_id: &RoomId) -> JoinOutcome {
        let mut state = self.state.lock().await;

        let previous = state.rooms_by_connection.get(connection_id).cloned();
        if previous.as_ref() == Some(room_id) {
            return JoinOutcome {
                left: None,
                newly_joined: false,
            };
        }

        if let Some(previous) = &previous {
            state.remove_member(connection_id, previous);
        }
        state
            .members
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id.clone());
        state
            .rooms_by_connection
            .insert(connection_id.clone(), room_id.clone());

        tracing::debug!(
            connection_id = %connection_id,
            room_id = %room_id,
            "Connection joined room"
        );

        JoinOutcome {
            left: previous,
            newly_joined: true,
        }
    }

    /// Remove the connection from the room. Returns `false` if it was not a member.
    pub async fn leave(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let mut state = self.state.lock().await;
        if state.rooms_by_connection.get(connection_id) != Some(room_id) {
            return false;
        }
        state.rooms_by_connection.remove(connection_id);
        state.remove_member(connection_id, room_id);
        tracing::debug!(connection_id = %connection_id, room_id = %room_id, "Connection left room");
        true
    }

    /// Drop every trace of the connection and return the room it was in.
    pub async fn disconnect(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        let mut state = self.state.lock().await;
        let room_id = state.rooms_by_connection.remove(connection_id)?;
        state.remove_member(connection_id, &room_id);
        Some(room_id)
    }

    pub async fn room_of(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        let state = self.state.lock().await;
        state.rooms_by_connection.get(connection_id).cloned()
    }

    pub async fn members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        state
            .members
            .get(room_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of rooms with at least one member
    pub async fn active_room_count(&self) -> usize {
        self.state.lock().await.members.len()
    }

    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.rooms_by_connection.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        // given:
        let registry = RoomRegistry::new();
        let conn = ConnectionId::generate();

        // when:
        let first = registry.join(&conn, &room("r1")).await;
        let second = registry.join(&conn, &room("r1")).await;

        // then:
        assert!(first.newly_joined);
        assert!(!second.newly_joined);
        assert_eq!(registry.members(&room("r1")).await, vec![conn.clone()]);
    }

    #[tokio::test]
    async fn test_join_other_room_leaves_previous() {
        // given:
        let registry = RoomRegistry::new();
        let conn = ConnectionId::generate();
        registry.join(&conn, &room("r1")).await;

        // when:
        let outcome = registry.join(&conn, &room("r2")).await;

        // then:
        assert_eq!(outcome.left, Some(room("r1")));
        assert!(registry.members(&room("r1")).await.is_empty());
        assert_eq!(registry.members(&room("r2")).await, vec![conn.clone()]);
        assert_eq!(registry.room_of(&conn).await, Some(room("r2")));
    }

    #[tokio::test]
    async fn test_leave_wrong_room_is_noop() {
        // given:
        let registry = RoomRegistry::new();
        let conn = ConnectionId::generate();
        registry.join(&conn, &room("r1")).await;

        // when:
        let left = registry.leave(&conn, &room("r2")).await;

        // then:
        assert!(!left);
        assert_eq!(registry.room_of(&conn).await, Some(room("r1")));
    }

    #[tokio::test]
    async fn test_disconnect_removes_membership() {
        // given:
        let registry = RoomRegistry::new();
        let alice = ConnectionId::generate();
        let bob = ConnectionId::generate();
        registry.join(&alice, &room("r1")).await;
        registry.join(&bob, &room("r1")).await;

        // when:
        let room_id = registry.disconnect(&alice).await;

        // then:
        assert_eq!(room_id, Some(room("r1")));
        assert_eq!(registry.members(&room("r1")).await, vec![bob]);
        assert_eq!(registry.disconnect(&alice).await, None);
        assert_eq!(registry.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        // given:
        let registry = RoomRegistry::new();
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();

        // when:
        registry.join(&a, &room("r1")).await;
        registry.join(&b, &room("r2")).await;

        // then:
        assert_eq!(registry.members(&room("r1")).await, vec![a]);
        assert_eq!(registry.members(&room("r2")).await, vec![b]);
        assert_eq!(registry.active_room_count().await, 2);
    }
}
