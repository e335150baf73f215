use crate::core::constants::SPLIT_TOLERANCE;
use crate::core::errors::LedgerError;
use crate::core::models::expense::{ExpenseSplit, ExpenseWithSplits, GroupExpense, NewExpense};
use crate::core::models::group::Membership;
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

/// Builds an expense and one equal split per member from a membership snapshot.
///
/// The payer's own split starts paid. Fails with `NotGroupMember` when the
/// payer is not in `members`.
pub fn split_equally(
    draft: &NewExpense,
    members: &[Membership],
    created_at: DateTime<Utc>,
) -> Result<ExpenseWithSplits, LedgerError> {
    if !members.iter().any(|m| m.user_id == draft.paid_by) {
        warn!("Payer {} not in group {}", draft.paid_by, draft.group_id);
        return Err(LedgerError::NotGroupMember(draft.paid_by.clone()));
    }

    let expense_id = Uuid::new_v4().to_string();
    let share = draft.amount / members.len() as f64;
    let splits = members
        .iter()
        .map(|m| ExpenseSplit {
            id: Uuid::new_v4().to_string(),
            expense_id: expense_id.clone(),
            user_id: m.user_id.clone(),
            share_amount: share,
            is_paid: m.user_id == draft.paid_by,
        })
        .collect();

    Ok(ExpenseWithSplits {
        expense: GroupExpense {
            id: expense_id,
            group_id: draft.group_id.clone(),
            paid_by: draft.paid_by.clone(),
            amount: draft.amount,
            title: draft.title.clone(),
            description: draft.description.clone(),
            date: draft.date,
            created_at,
        },
        splits,
    })
}

/// Rejects an expense whose shares do not add up to its amount.
pub fn check_split_sum(entry: &ExpenseWithSplits) -> Result<(), LedgerError> {
    let total = entry.share_total();
    if (total - entry.expense.amount).abs() > SPLIT_TOLERANCE {
        return Err(LedgerError::InvalidSplit {
            expected: entry.expense.amount,
            actual: total,
        });
    }
    Ok(())
}
