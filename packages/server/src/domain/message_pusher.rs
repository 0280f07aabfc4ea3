//! MessagePusher trait definition
//!
//! Outbound delivery to live connections. The WebSocket implementation lives in
//! the infrastructure layer; use cases only see this trait.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// Channel carrying serialized frames to one connection's writer task
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register the outbound channel of a newly connected client
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Forget a connection's outbound channel
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// Push a frame to exactly one connection
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Push a frame to every target
    ///
    /// Fire-and-forget: individual delivery failures are logged, not returned.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
