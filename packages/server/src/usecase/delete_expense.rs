//! UseCase: 支出の削除
//!
//! Only the payer may delete an expense. Success broadcasts `expenseDeleted`
//! carrying the expense id only.

use std::sync::Arc;

use crate::domain::{ExpenseId, ExpenseRepository, RoomEvent, RoomId, UserId};

use super::{broadcast::RoomBroadcaster, error::DeleteExpenseError};

pub struct DeleteExpenseUseCase {
    repository: Arc<dyn ExpenseRepository>,
    broadcaster: Arc<RoomBroadcaster>,
}

impl DeleteExpenseUseCase {
    pub fn new(repository: Arc<dyn ExpenseRepository>, broadcaster: Arc<RoomBroadcaster>) -> Self {
        Self {
            repository,
            broadcaster,
        }
    }

    pub async fn execute(
        &self,
        room_id: &RoomId,
        expense_id: &ExpenseId,
        requester: &UserId,
    ) -> Result<ExpenseId, DeleteExpenseError> {
        let _guard = self.broadcaster.lock_room(room_id).await;

        let expense = self.repository.get(room_id, expense_id).await?;
        if !expense.can_be_deleted_by(requester) {
            tracing::warn!(
                room_id = %room_id,
                user_id = %requester,
                expense_id = %expense_id,
                "Rejected expense deletion by non-payer"
            );
            return Err(DeleteExpenseError::NotPayer {
                expense_id: expense_id.to_string(),
                requester: requester.clone(),
            });
        }

        let removed = self.repository.remove(room_id, expense_id).await?;
        self.broadcaster
            .publish(room_id, None, RoomEvent::ExpenseDeleted(&removed.id))
            .await;

        tracing::info!(
            room_id = %room_id,
            user_id = %requester,
            expense_id = %removed.id,
            "Expense deleted"
        );
        Ok(removed.id)
    }
}
