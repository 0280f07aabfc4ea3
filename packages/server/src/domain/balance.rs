//! Balance engine
//!
//! Pure functions that reduce a room's ledger to per-user net balances and then to a
//! short list of settling transfers. Nothing here is cached: every summary is computed
//! from the full snapshot handed in by the caller.
//!
//! The greedy simplification is deterministic for a given input order:
//! balances keep first-encounter order, and both creditor and debtor lists are
//! stable-sorted so equal amounts keep that order.

use std::collections::HashMap;

use super::{Expense, Settlement, UserId};

/// Floating-point noise threshold for money comparisons
pub const BALANCE_EPSILON: f64 = 0.01;

/// Signed net amount for one user: positive is owed money, negative owes money
#[derive(Debug, Clone, PartialEq)]
pub struct NetBalance {
    pub user_id: UserId,
    pub amount: f64,
}

/// Suggested payment that moves balances towards zero
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub from: UserId,
    pub to: UserId,
    pub amount: f64,
}

/// How a balance reads from the user's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceStatus {
    /// The user is owed money
    Owed,
    /// The user owes money
    Owes,
    /// Within noise of zero
    Settled,
}

impl BalanceStatus {
    pub fn of(amount: f64) -> Self {
        if amount > BALANCE_EPSILON {
            Self::Owed
        } else if amount < -BALANCE_EPSILON {
            Self::Owes
        } else {
            Self::Settled
        }
    }
}

/// Running totals keyed by user, in first-encounter order
#[derive(Debug, Default, Clone)]
pub struct BalanceSheet {
    entries: Vec<NetBalance>,
    index: HashMap<UserId, usize>,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net balances of a ledger (expenses only)
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        let mut sheet = Self::new();
        for expense in expenses {
            sheet.apply_expense(expense);
        }
        sheet
    }

    /// Credit the payer with the full amount and debit every participant their share.
    ///
    /// The payer's own share is debited too when they are a participant, so their
    /// net credit is `amount - amount / n`.
    pub fn apply_expense(&mut self, expense: &Expense) {
        self.adjust(&expense.paid_by, expense.amount.value());
        let share = expense.share();
        for participant in expense.split_between.ids() {
            self.adjust(participant, -share);
        }
    }

    /// A recorded payment: the payer's debt shrinks, the receiver's credit shrinks.
    pub fn apply_settlement(&mut self, settlement: &Settlement) {
        let amount = settlement.amount.value();
        self.adjust(&settlement.from, amount);
        self.adjust(&settlement.to, -amount);
    }

    pub fn balances(&self) -> &[NetBalance] {
        &self.entries
    }

    pub fn into_balances(self) -> Vec<NetBalance> {
        self.entries
    }

    pub fn get(&self, user_id: &UserId) -> Option<f64> {
        self.index.get(user_id).map(|&i| self.entries[i].amount)
    }

    /// Sum of all balances; zero up to rounding for any ledger
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|b| b.amount).sum()
    }

    fn adjust(&mut self, user_id: &UserId, delta: f64) {
        let i = match self.index.get(user_id) {
            Some(&i) => i,
            None => {
                self.entries.push(NetBalance {
                    user_id: user_id.clone(),
                    amount: 0.0,
                });
                self.index.insert(user_id.clone(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[i].amount += delta;
    }
}

/// Per-user net balances of a ledger, in first-encounter order.
pub fn compute_balances(expenses: &[Expense]) -> Vec<NetBalance> {
    BalanceSheet::from_expenses(expenses).into_balances()
}

struct Party {
    user_id: UserId,
    remaining: f64,
}

/// Greedy creditor/debtor matching.
///
/// Creditors (> +0.01) and debtors (< -0.01) are each sorted by magnitude, largest
/// first. The largest creditor and largest debtor settle `min` of their remainders;
/// a transfer is emitted when that amount exceeds 0.01, and any party left within
/// 0.01 of zero is skipped. Stops when either list is exhausted.
pub fn simplify_debts(balances: &[NetBalance]) -> Vec<Transfer> {
    let mut creditors: Vec<Party> = Vec::new();
    let mut debtors: Vec<Party> = Vec::new();

    for balance in balances {
        if balance.amount > BALANCE_EPSILON {
            creditors.push(Party {
                user_id: balance.user_id.clone(),
                remaining: balance.amount,
            });
        } else if balance.amount < -BALANCE_EPSILON {
            debtors.push(Party {
                user_id: balance.user_id.clone(),
                remaining: -balance.amount,
            });
        }
    }

    // sort_by is stable: ties keep first-encounter order
    creditors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));
    debtors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));

    let mut transfers = Vec::new();
    let mut ci = 0;
    let mut di = 0;

    while ci < creditors.len() && di < debtors.len() {
        let amount = creditors[ci].remaining.min(debtors[di].remaining);

        if amount > BALANCE_EPSILON {
            transfers.push(Transfer {
                from: debtors[di].user_id.clone(),
                to: creditors[ci].user_id.clone(),
                amount: round_cents(amount),
            });
        }

        creditors[ci].remaining -= amount;
        debtors[di].remaining -= amount;

        if creditors[ci].remaining < BALANCE_EPSILON {
            ci += 1;
        }
        if debtors[di].remaining < BALANCE_EPSILON {
            di += 1;
        }
    }

    transfers
}

/// Derived view of a room's ledger
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseSummary {
    pub balances: Vec<NetBalance>,
    /// Suggested transfers that would zero out `balances`
    pub settlements: Vec<Transfer>,
    pub total_expenses: usize,
    pub total_amount: f64,
}

/// Summarize a ledger snapshot together with the settlements already recorded.
pub fn summarize(expenses: &[Expense], recorded: &[Settlement]) -> ExpenseSummary {
    let mut sheet = BalanceSheet::from_expenses(expenses);
    for settlement in recorded {
        sheet.apply_settlement(settlement);
    }
    let balances = sheet.into_balances();
    let settlements = simplify_debts(&balances);

    ExpenseSummary {
        balances,
        settlements,
        total_expenses: expenses.len(),
        total_amount: expenses.iter().map(|e| e.amount.value()).sum(),
    }
}

/// Round to two decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
