//! UseCase: 支出の追加
//!
//! Validates the input into an [`Expense`], stores it and broadcasts `newExpense`
//! to the whole room.

use std::{str::FromStr, sync::Arc};

use wayfare_shared::time::Clock;

use crate::domain::{
    Amount, Description, Expense, ExpenseCategory, ExpenseRepository, RecordedExpense, RoomEvent,
    RoomId, SplitBetween, Timestamp, UserDirectory, UserId,
};

use super::{broadcast::RoomBroadcaster, error::AddExpenseError, get_expenses::resolve_expense};

/// Input of [`AddExpenseUseCase::execute`]
#[derive(Debug, Clone)]
pub struct AddExpenseCommand {
    pub room_id: RoomId,
    /// User bound to the connection
    pub actor: UserId,
    pub description: String,
    pub amount: f64,
    /// Defaults to `actor`
    pub paid_by: Option<UserId>,
    pub split_between: Vec<UserId>,
    pub category: Option<String>,
    pub timestamp: Option<i64>,
}

pub struct AddExpenseUseCase {
    repository: Arc<dyn ExpenseRepository>,
    broadcaster: Arc<RoomBroadcaster>,
    user_directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl AddExpenseUseCase {
    pub fn new(
        repository: Arc<dyn ExpenseRepository>,
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
        command: AddExpenseCommand,
    ) -> Result<RecordedExpense, AddExpenseError> {
        let description = Description::new(command.description)?;
        let amount = Amount::new(command.amount)?;
        let split_between = SplitBetween::new(command.split_between)?;
        let category = match command.category.as_deref() {
            Some(category) => ExpenseCategory::from_str(category)?,
            None => ExpenseCategory::default(),
        };
        let created_at = Timestamp::new(
            command
                .timestamp
                .unwrap_or_else(|| self.clock.now_millis()),
        );
        let paid_by = command.paid_by.unwrap_or_else(|| command.actor.clone());

        let expense = Expense::new(
            command.room_id.clone(),
            description,
            amount,
            paid_by,
            split_between,
            category,
            created_at,
        );
        let pending = resolve_expense(self.user_directory.as_ref(), expense).await;

        let _guard = self.broadcaster.lock_room(&command.room_id).await;
        let expense = self.repository.add(pending.expense).await?;
        let recorded = RecordedExpense { expense, ..pending };
        self.broadcaster
            .publish(&command.room_id, None, RoomEvent::ExpenseAdded(&recorded))
            .await;

        tracing::info!(
            room_id = %command.room_id,
            user_id = %command.actor,
            expense_id = %recorded.expense.id,
            amount = recorded.expense.amount.value(),
            "Expense added"
        );
        Ok(recorded)
    }
}
