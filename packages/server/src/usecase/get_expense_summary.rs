//! UseCase: 精算サマリーの計算
//!
//! Reads a snapshot of the room's expenses and recorded settlements, runs the
//! balance engine and resolves every user that appears in the result.

use std::sync::Arc;

use crate::domain::{
    ExpenseRepository, ProfileBook, RoomId, SettlementRepository, SummaryReport, UserDirectory,
    UserId, summarize, user_directory::resolve_or_unknown,
};

use super::error::QueryError;

pub struct GetExpenseSummaryUseCase {
    expenses: Arc<dyn ExpenseRepository>,
    settlements: Arc<dyn SettlementRepository>,
    user_directory: Arc<dyn UserDirectory>,
}

impl GetExpenseSummaryUseCase {
    pub fn new(
        expenses: Arc<dyn ExpenseRepository>,
        settlements: Arc<dyn SettlementRepository>,
        user_directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            expenses,
            settlements,
            user_directory,
        }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Result<SummaryReport, QueryError> {
        let expenses = self.expenses.list(room_id).await?;
        let recorded = self.settlements.list(room_id).await?;
        let summary = summarize(&expenses, &recorded);

        let mentioned = summary
            .balances
            .iter()
            .map(|b| &b.user_id)
            .chain(recorded.iter().flat_map(|s| [&s.from, &s.to]));
        let mut profiles = ProfileBook::new();
        for user_id in mentioned {
            if !profiles.contains(user_id) {
                profiles.insert(self.lookup(user_id).await);
            }
        }

        Ok(SummaryReport {
            summary,
            recorded,
            profiles,
        })
    }

    async fn lookup(&self, user_id: &UserId) -> crate::domain::UserProfile {
        resolve_or_unknown(self.user_directory.as_ref(), user_id).await
    }
}
