use crate::core::models::expense::ExpenseWithSplits;
use crate::core::models::group::Membership;
use std::collections::BTreeMap;

/// Signed balance per user id. Positive means the user is owed money.
pub type Balances = BTreeMap<String, f64>;

/// Net position of every user in a group.
///
/// Each unpaid split is a debt from its user to the expense payer, so it adds
/// to the payer's balance and subtracts from the split user's balance. Paid
/// splits, including the payer's own share, contribute nothing. Current
/// members always appear, with `0.0` when they neither owe nor are owed;
/// former members appear only if expenses still reference them.
pub fn compute_balances(members: &[Membership], expenses: &[ExpenseWithSplits]) -> Balances {
    let mut balances: Balances = members.iter().map(|m| (m.user_id.clone(), 0.0)).collect();

    for entry in expenses {
        let payer = &entry.expense.paid_by;
        balances.entry(payer.clone()).or_insert(0.0);
        for split in entry.splits.iter().filter(|s| !s.is_paid && s.user_id != *payer) {
            *balances.entry(payer.clone()).or_insert(0.0) += split.share_amount;
            *balances.entry(split.user_id.clone()).or_insert(0.0) -= split.share_amount;
        }
    }

    balances
}

/// Amount paid and number of expenses paid by one user.
pub fn paid_totals(user_id: &str, expenses: &[ExpenseWithSplits]) -> (f64, usize) {
    expenses
        .iter()
        .filter(|e| e.expense.paid_by == user_id)
        .fold((0.0, 0), |(total, count), e| (total + e.expense.amount, count + 1))
}
