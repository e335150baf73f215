use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupExpense {
    pub id: String,
    pub group_id: String,
    pub paid_by: String,
    pub amount: f64,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseSplit {
    pub id: String,
    pub expense_id: String,
    pub user_id: String,
    pub share_amount: f64,
    /// Only ever goes from `false` to `true`.
    pub is_paid: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseWithSplits {
    #[serde(flatten)]
    pub expense: GroupExpense,
    pub splits: Vec<ExpenseSplit>,
}

impl ExpenseWithSplits {
    pub fn share_total(&self) -> f64 {
        self.splits.iter().map(|s| s.share_amount).sum()
    }
}

/// Input for recording a group expense. Splits are derived from the membership
/// snapshot taken inside the storage write scope.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub group_id: String,
    pub paid_by: String,
    pub amount: f64,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
}

/// Outcome of marking a split as paid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitPayment {
    Settled { group_id: String },
    AlreadyPaid,
}
