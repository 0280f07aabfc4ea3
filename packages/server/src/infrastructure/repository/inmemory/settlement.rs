//! InMemory Settlement Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, RoomId, Settlement, SettlementRepository};

#[derive(Default)]
pub struct InMemorySettlementRepository {
    rooms: Mutex<HashMap<RoomId, Vec<Settlement>>>,
}

impl InMemorySettlementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettlementRepository for InMemorySettlementRepository {
    async fn add(&self, settlement: Settlement) -> Result<Settlement, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(settlement.room_id.clone())
            .or_default()
            .push(settlement.clone());
        Ok(settlement)
    }

    async fn list(&self, room_id: &RoomId) -> Result<Vec<Settlement>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.get(room_id).cloned().unwrap_or_default())
    }
}
