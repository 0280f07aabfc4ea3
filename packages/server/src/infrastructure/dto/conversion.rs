//! Conversion logic from domain views to DTOs.

use wayfare_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    BalanceStatus, PostedMessage, RecordedExpense, RecordedSettlement, Settlement,
    SummaryReport, UserId, balance::round_cents,
};

use super::websocket::{
    BalanceDto, ExpenseDto, ExpenseSummaryDto, MessageDto, SettlementDto, TransferDto,
};

/// Label substituted for the viewer's own name in summaries
pub const VIEWER_LABEL: &str = "You";

impl From<&PostedMessage> for MessageDto {
    fn from(view: &PostedMessage) -> Self {
        let message = &view.message;
        Self {
            id: message.id.to_string(),
            chat_id: message.room_id.to_string(),
            sender: message.sender.to_string(),
            sender_name: view.sender.name.clone(),
            sender_picture: view.sender.profile_picture.clone(),
            sender_verified: view.sender.verified,
            content: message.content.as_str().to_string(),
            timestamp: timestamp_to_rfc3339(message.timestamp.value()),
            read: message.read,
        }
    }
}

impl From<&RecordedExpense> for ExpenseDto {
    fn from(view: &RecordedExpense) -> Self {
        let expense = &view.expense;
        Self {
            id: expense.id.to_string(),
            chat_id: expense.room_id.to_string(),
            description: expense.description.as_str().to_string(),
            amount: expense.amount.value(),
            paid_by: expense.paid_by.to_string(),
            paid_by_name: view.payer.name.clone(),
            split_between: expense
                .split_between
                .ids()
                .iter()
                .map(ToString::to_string)
                .collect(),
            split_between_names: view.participants.iter().map(|p| p.name.clone()).collect(),
            category: expense.category.to_string(),
            timestamp: timestamp_to_rfc3339(expense.created_at.value()),
        }
    }
}

impl From<&RecordedSettlement> for SettlementDto {
    fn from(view: &RecordedSettlement) -> Self {
        settlement_dto(&view.settlement, view.from.name.clone(), view.to.name.clone())
    }
}

fn settlement_dto(settlement: &Settlement, from_name: String, to_name: String) -> SettlementDto {
    SettlementDto {
        id: settlement.id.to_string(),
        chat_id: settlement.room_id.to_string(),
        from: settlement.from.to_string(),
        from_name,
        to: settlement.to.to_string(),
        to_name,
        amount: round_cents(settlement.amount.value()),
        settled: true,
        timestamp: timestamp_to_rfc3339(settlement.created_at.value()),
    }
}

fn status_label(status: BalanceStatus) -> &'static str {
    match status {
        BalanceStatus::Owed => "owed",
        BalanceStatus::Owes => "owes",
        BalanceStatus::Settled => "settled",
    }
}

impl ExpenseSummaryDto {
    /// Render a summary, naming `viewer` as "You" when given.
    pub fn from_report(report: &SummaryReport, viewer: Option<&UserId>) -> Self {
        let name = |id: &UserId| -> String {
            if Some(id) == viewer {
                VIEWER_LABEL.to_string()
            } else {
                report.profiles.name_of(id)
            }
        };

        let summary = &report.summary;
        Self {
            balances: summary
                .balances
                .iter()
                .map(|b| BalanceDto {
                    user_id: b.user_id.to_string(),
                    name: name(&b.user_id),
                    amount: round_cents(b.amount),
                    status: status_label(BalanceStatus::of(b.amount)).to_string(),
                })
                .collect(),
            settlements: summary
                .settlements
                .iter()
                .map(|t| TransferDto {
                    from: t.from.to_string(),
                    from_name: name(&t.from),
                    to: t.to.to_string(),
                    to_name: name(&t.to),
                    amount: t.amount,
                })
                .collect(),
            recorded: report
                .recorded
                .iter()
                .map(|s| settlement_dto(s, name(&s.from), name(&s.to)))
                .collect(),
            total_expenses: summary.total_expenses,
            total_amount: round_cents(summary.total_amount),
        }
    }
}
