//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - Keep the `UnboundedSender` of every live connection
//! - Deliver serialized frames to one connection (`push_to`) or many (`broadcast`)
//!
//! ## 設計ノート
//!
//! Sockets are accepted in the UI layer (`ui/handler/websocket.rs`), which creates the
//! channel and hands the sender over here. The writer task on the other end of the
//! channel owns the socket sink.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// WebSocket を使った MessagePusher 実装
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new(Arc::new(Mutex::new(HashMap::new())));
/// pusher.register_connection(connection_id.clone(), tx).await;
/// pusher.push_to(&connection_id, r#"{"event":"ack","ack":1,"data":{"success":true}}"#).await?;
/// ```
pub struct WebSocketMessagePusher {
    /// Key: connection id, Value: outbound channel of that connection
    connections: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(connections: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { connections }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        connections.insert(connection_id, sender);
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(connection_id);
        tracing::debug!("Connection '{}' unregistered from MessagePusher", connection_id);
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let connections = self.connections.lock().await;

        if let Some(sender) = connections.get(connection_id) {
            sender
                .send(content.to_string())
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed message to connection '{}'", connection_id);
            Ok(())
        } else {
            Err(MessagePushError::ConnectionNotFound(
                connection_id.to_string(),
            ))
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let connections = self.connections.lock().await;

        for target in targets {
            if let Some(sender) = connections.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                if let Err(e) = sender.send(content.to_string()) {
                    tracing::warn!("Failed to push message to connection '{}': {}", target, e);
                } else {
                    tracing::debug!("Broadcasted message to connection '{}'", target);
                }
            } else {
                tracing::warn!(
                    "Connection '{}' not found during broadcast, skipping",
                    target
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn create_test_pusher() -> (
        WebSocketMessagePusher,
        Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
    ) {
        let connections = Arc::new(Mutex::new(HashMap::new()));
        let pusher = WebSocketMessagePusher::new(connections.clone());
        (pusher, connections)
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // given:
        let (pusher, _connections) = create_test_pusher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        pusher.register_connection(connection_id.clone(), tx).await;

        // when:
        let result = pusher.push_to(&connection_id, "Hello").await;

        // then:
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_connection_not_found() {
        // given:
        let (pusher, _connections) = create_test_pusher();
        let connection_id = ConnectionId::generate();

        // when:
        let result = pusher.push_to(&connection_id, "Hello").await;

        // then:
        assert!(matches!(
            result,
            Err(MessagePushError::ConnectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_push_to_closed_channel_fails() {
        // given: the writer task is gone
        let (pusher, _connections) = create_test_pusher();
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        pusher.register_connection(connection_id.clone(), tx).await;
        drop(rx);

        // when:
        let result = pusher.push_to(&connection_id, "Hello").await;

        // then:
        assert!(matches!(result, Err(MessagePushError::PushFailed(_))));
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // given:
        let (pusher, connections) = create_test_pusher();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let alive = ConnectionId::generate();
        let gone = ConnectionId::generate();
        connections.lock().await.insert(alive.clone(), tx1);

        // when:
        let result = pusher.broadcast(vec![alive, gone], "Broadcast").await;

        // then: partial failure is tolerated
        assert!(result.is_ok());
        assert_eq!(rx1.recv().await, Some("Broadcast".to_string()));
    }

    #[tokio::test]
    async fn test_unregister_removes_connection() {
        // given:
        let (pusher, _connections) = create_test_pusher();
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        pusher.register_connection(connection_id.clone(), tx).await;

        // when:
        pusher.unregister_connection(&connection_id).await;

        // then:
        assert_eq!(pusher.connection_count().await, 0);
    }
}
