//! InMemory Expense Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Expense, ExpenseId, ExpenseRepository, RepositoryError, RoomId};

/// インメモリ Expense Repository 実装
///
/// Each room's ledger is a `Vec` in insertion order.
#[derive(Default)]
pub struct InMemoryExpenseRepository {
    rooms: Mutex<HashMap<RoomId, Vec<Expense>>>,
}

impl InMemoryExpenseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    async fn add(&self, expense: Expense) -> Result<Expense, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(expense.room_id.clone())
            .or_default()
            .push(expense.clone());
        Ok(expense)
    }

    async fn get(
        &self,
        room_id: &RoomId,
        expense_id: &ExpenseId,
    ) -> Result<Expense, RepositoryError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .and_then(|ledger| ledger.iter().find(|e| &e.id == expense_id))
            .cloned()
            .ok_or_else(|| RepositoryError::ExpenseNotFound(expense_id.to_string()))
    }

    async fn remove(
        &self,
        room_id: &RoomId,
        expense_id: &ExpenseId,
    ) -> Result<Expense, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let ledger = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::ExpenseNotFound(expense_id.to_string()))?;
        let position = ledger
            .iter()
            .position(|e| &e.id == expense_id)
            .ok_or_else(|| RepositoryError::ExpenseNotFound(expense_id.to_string()))?;
        Ok(ledger.remove(position))
    }

    async fn list(&self, room_id: &RoomId) -> Result<Vec<Expense>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.get(room_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Amount, Description, ExpenseCategory, SplitBetween, Timestamp, UserId};

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn expense(room_id: &str, description: &str) -> Expense {
        let alice = UserId::new("alice".to_string()).unwrap();
        Expense::new(
            room(room_id),
            Description::new(description.to_string()).unwrap(),
            Amount::new(12.5).unwrap(),
            alice.clone(),
            SplitBetween::new(vec![alice]).unwrap(),
            ExpenseCategory::Food,
            Timestamp::new(0),
        )
    }

    #[tokio::test]
    async fn test_add_and_list_per_room() {
        // given:
        let repo = InMemoryExpenseRepository::new();

        // when:
        repo.add(expense("R", "Lunch")).await.unwrap();
        repo.add(expense("S", "Taxi")).await.unwrap();
        repo.add(expense("R", "Dinner")).await.unwrap();

        // then:
        let ledger = repo.list(&room("R")).await.unwrap();
        let descriptions: Vec<&str> = ledger.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Lunch", "Dinner"]);
        assert_eq!(repo.list(&room("S")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_returns_record_and_forgets_it() {
        // given:
        let repo = InMemoryExpenseRepository::new();
        let stored = repo.add(expense("R", "Lunch")).await.unwrap();

        // when:
        let removed = repo.remove(&room("R"), &stored.id).await.unwrap();

        // then:
        assert_eq!(removed, stored);
        assert_eq!(
            repo.get(&room("R"), &stored.id).await,
            Err(RepositoryError::ExpenseNotFound(stored.id.to_string()))
        );
    }

    #[tokio::test]
    async fn test_expense_is_scoped_to_its_room() {
        // given:
        let repo = InMemoryExpenseRepository::new();
        let stored = repo.add(expense("R", "Lunch")).await.unwrap();

        // when:
        let result = repo.remove(&room("S"), &stored.id).await;

        // then:
        assert!(matches!(result, Err(RepositoryError::ExpenseNotFound(_))));
        assert!(repo.get(&room("R"), &stored.id).await.is_ok());
    }
}
