//! Domain entities: chat messages, expenses, settlements and user profiles.

use std::{fmt, str::FromStr};

use serde::Serialize;

use super::{
    error::ValueObjectError,
    value_object::{
        Amount, Description, ExpenseId, MessageContent, MessageId, RoomId, SettlementId,
        Timestamp, UserId,
    },
};

/// A chat message posted to a room
///
/// Immutable once created. Ordered by `timestamp`, ties broken by insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender: UserId,
    pub content: MessageContent,
    pub timestamp: Timestamp,
    pub read: bool,
}

impl ChatMessage {
    pub fn new(
        room_id: RoomId,
        sender: UserId,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            room_id,
            sender,
            content,
            timestamp,
            read: false,
        }
    }
}

/// Expense category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Accommodation,
    Activities,
    Shopping,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Accommodation => "accommodation",
            Self::Activities => "activities",
            Self::Shopping => "shopping",
            Self::Other => "other",
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "accommodation" => Ok(Self::Accommodation),
            "activities" => Ok(Self::Activities),
            "shopping" => Ok(Self::Shopping),
            "other" | "" => Ok(Self::Other),
            other => Err(ValueObjectError::UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Participants an expense is split between
///
/// Non-empty, duplicates removed, first-seen order kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SplitBetween(Vec<UserId>);

impl SplitBetween {
    pub fn new(ids: Vec<UserId>) -> Result<Self, ValueObjectError> {
        let mut unique: Vec<UserId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            return Err(ValueObjectError::EmptyParticipants);
        }
        Ok(Self(unique))
    }

    pub fn ids(&self) -> &[UserId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.0.contains(id)
    }
}

/// One record in a room's expense ledger
///
/// Never updated; corrections are delete + re-add. Only `paid_by` may delete it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub room_id: RoomId,
    pub description: Description,
    pub amount: Amount,
    pub paid_by: UserId,
    pub split_between: SplitBetween,
    pub category: ExpenseCategory,
    pub created_at: Timestamp,
}

impl Expense {
    pub fn new(
        room_id: RoomId,
        description: Description,
        amount: Amount,
        paid_by: UserId,
        split_between: SplitBetween,
        category: ExpenseCategory,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: ExpenseId::generate(),
            room_id,
            description,
            amount,
            paid_by,
            split_between,
            category,
            created_at,
        }
    }

    /// Amount owed by each participant
    pub fn share(&self) -> f64 {
        self.amount.value() / self.split_between.len() as f64
    }

    pub fn can_be_deleted_by(&self, requester: &UserId) -> bool {
        &self.paid_by == requester
    }
}

/// A recorded payment from one room member to another
///
/// Settlements feed back into balance computation: `from` is credited and `to`
/// is debited by `amount`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub room_id: RoomId,
    pub from: UserId,
    pub to: UserId,
    pub amount: Amount,
    pub recorded_by: UserId,
    pub created_at: Timestamp,
}

impl Settlement {
    pub fn new(
        room_id: RoomId,
        from: UserId,
        to: UserId,
        amount: Amount,
        recorded_by: UserId,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: SettlementId::generate(),
            room_id,
            from,
            to,
            amount,
            recorded_by,
            created_at,
        }
    }
}

/// Display data resolved from the user directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub profile_picture: Option<String>,
    pub verified: bool,
}

impl UserProfile {
    /// Label used when the directory cannot resolve a user
    pub const UNKNOWN_NAME: &'static str = "Unknown User";

    /// Placeholder profile for an unresolved user
    pub fn unknown(id: UserId) -> Self {
        Self {
            id,
            name: Self::UNKNOWN_NAME.to_string(),
            profile_picture: None,
            verified: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_split_between_removes_duplicates_keeping_order() {
        // given:
        let ids = vec![uid("bob"), uid("alice"), uid("bob"), uid("carol")];

        // when:
        let split = SplitBetween::new(ids).unwrap();

        // then:
        assert_eq!(split.ids(), &[uid("bob"), uid("alice"), uid("carol")]);
    }

    #[test]
    fn test_split_between_rejects_empty() {
        assert_eq!(
            SplitBetween::new(vec![]),
            Err(ValueObjectError::EmptyParticipants)
        );
    }

    #[test]
    fn test_expense_share_and_delete_permission() {
        // given:
        let expense = Expense::new(
            RoomId::new("visit-1".to_string()).unwrap(),
            Description::new("Dinner".to_string()).unwrap(),
            Amount::new(30.0).unwrap(),
            uid("alice"),
            SplitBetween::new(vec![uid("alice"), uid("bob"), uid("carol")]).unwrap(),
            ExpenseCategory::Food,
            Timestamp::new(1000),
        );

        // then:
        assert!((expense.share() - 10.0).abs() < 1e-9);
        assert!(expense.can_be_deleted_by(&uid("alice")));
        assert!(!expense.can_be_deleted_by(&uid("bob")));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Food".parse::<ExpenseCategory>(), Ok(ExpenseCategory::Food));
        assert_eq!("".parse::<ExpenseCategory>(), Ok(ExpenseCategory::Other));
        assert!("spaceship".parse::<ExpenseCategory>().is_err());
    }
}
