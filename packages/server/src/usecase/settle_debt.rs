//! UseCase: 精算の記録
//!
//! A settlement says `from` paid `to` some amount outside the app. It nets out of
//! later balance computations. Only one of the two parties may record it.

use std::sync::Arc;

use wayfare_shared::time::Clock;

use crate::domain::{
    Amount, RecordedSettlement, RoomEvent, RoomId, Settlement, SettlementRepository, Timestamp,
    UserDirectory, UserId, user_directory::resolve_or_unknown,
};

use super::{broadcast::RoomBroadcaster, error::SettleDebtError};

#[derive(Debug, Clone)]
pub struct SettleDebtCommand {
    pub room_id: RoomId,
    /// User bound to the connection
    pub actor: UserId,
    pub from: UserId,
    pub to: UserId,
    pub amount: f64,
}

pub struct SettleDebtUseCase {
    repository: Arc<dyn SettlementRepository>,
    broadcaster: Arc<RoomBroadcaster>,
    user_directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl SettleDebtUseCase {
    pub fn new(
        repository: Arc<dyn SettlementRepository>,
        broadcaster: Arc<RoomBroadcaster>,
        user_directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            broadcaster,
            user_directory,
            clock,
        }
    }

    pub async fn execute(
        &self,
        command: SettleDebtCommand,
    ) -> Result<RecordedSettlement, SettleDebtError> {
        let amount = Amount::new(command.amount)?;
        if command.from == command.to {
            return Err(SettleDebtError::SameParty);
        }
        if command.actor != command.from && command.actor != command.to {
            return Err(SettleDebtError::NotParty);
        }

        let from = resolve_or_unknown(self.user_directory.as_ref(), &command.from).await;
        let to = resolve_or_unknown(self.user_directory.as_ref(), &command.to).await;
        let settlement = Settlement::new(
            command.room_id.clone(),
            command.from,
            command.to,
            amount,
            command.actor,
            Timestamp::new(self.clock.now_millis()),
        );

        let _guard = self.broadcaster.lock_room(&command.room_id).await;
        let settlement = self.repository.add(settlement).await?;
        let recorded = RecordedSettlement {
            settlement,
            from,
            to,
        };
        self.broadcaster
            .publish(&command.room_id, None, RoomEvent::DebtSettled(&recorded))
            .await;

        tracing::info!(
            room_id = %command.room_id,
            user_id = %recorded.settlement.recorded_by,
            from = %recorded.settlement.from,
            to = %recorded.settlement.to,
            amount = amount.value(),
            "Debt settled"
        );
        Ok(recorded)
    }
}
