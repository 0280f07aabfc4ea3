//! Directory-enriched views of domain records, ready to be rendered for clients.

use std::collections::HashMap;

use super::{ChatMessage, Expense, ExpenseSummary, Settlement, UserId, UserProfile};

#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub message: ChatMessage,
    pub sender: UserProfile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedExpense {
    pub expense: Expense,
    pub payer: UserProfile,
    /// Same order as `expense.split_between`
    pub participants: Vec<UserProfile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSettlement {
    pub settlement: Settlement,
    pub from: UserProfile,
    pub to: UserProfile,
}

/// Profiles resolved for one request, keyed by user id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileBook {
    profiles: HashMap<UserId, UserProfile>,
}

impl ProfileBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: UserProfile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.profiles.contains_key(user_id)
    }

    /// Display name, or the unknown label for ids never resolved
    pub fn name_of(&self, user_id: &UserId) -> String {
        self.profiles
            .get(user_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UserProfile::UNKNOWN_NAME.to_string())
    }

    pub fn get(&self, user_id: &UserId) -> Option<&UserProfile> {
        self.profiles.get(user_id)
    }
}

/// Summary of a room's ledger plus everything needed to render it
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub summary: ExpenseSummary,
    pub recorded: Vec<Settlement>,
    pub profiles: ProfileBook,
}
