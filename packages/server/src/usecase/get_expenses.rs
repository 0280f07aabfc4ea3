//! UseCase: 支出一覧の取得

use std::sync::Arc;

use crate::domain::{
    Expense, ExpenseRepository, RecordedExpense, RoomId, UserDirectory,
    user_directory::{resolve_all_or_unknown, resolve_or_unknown},
};

use super::error::QueryError;

/// Attach payer and participant profiles to an expense.
pub(crate) async fn resolve_expense(
    directory: &dyn UserDirectory,
    expense: Expense,
) -> RecordedExpense {
    let payer = resolve_or_unknown(directory, &expense.paid_by).await;
    let participants = resolve_all_or_unknown(directory, expense.split_between.ids()).await;
    RecordedExpense {
        expense,
        payer,
        participants,
    }
}

pub struct GetExpensesUseCase {
    repository: Arc<dyn ExpenseRepository>,
    user_directory: Arc<dyn UserDirectory>,
}

impl GetExpensesUseCase {
    pub fn new(
        repository: Arc<dyn ExpenseRepository>,
        user_directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            repository,
            user_directory,
        }
    }

    /// Every expense of the room, newest first.
    pub async fn execute(&self, room_id: &RoomId) -> Result<Vec<RecordedExpense>, QueryError> {
        let mut expenses = self.repository.list(room_id).await?;
        // stable: equal timestamps keep insertion order
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut recorded = Vec::with_capacity(expenses.len());
        for expense in expenses {
            recorded.push(resolve_expense(self.user_directory.as_ref(), expense).await);
        }
        Ok(recorded)
    }
}
