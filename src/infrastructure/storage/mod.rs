use crate::core::errors::LedgerError;
use crate::core::models::{
    expense::{ExpenseWithSplits, SplitPayment},
    group::{Group, Membership},
    user::User,
};
use async_trait::async_trait;

/// Builds an expense from the group's membership at the moment of writing.
pub type ExpenseBuilder =
    Box<dyn FnOnce(&[Membership]) -> Result<ExpenseWithSplits, LedgerError> + Send>;

/// A consistent read of one group's ledger.
#[derive(Clone, Debug)]
pub struct GroupLedger {
    pub group: Group,
    pub members: Vec<Membership>,
    pub expenses: Vec<ExpenseWithSplits>,
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_user(&self, user: User) -> Result<User, LedgerError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, LedgerError>;

    /// Stores the group and its creator's membership together.
    async fn create_group(&self, group: Group, creator: Membership) -> Result<(), LedgerError>;
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, LedgerError>;
    async fn get_group_by_invite_code(&self, code: &str) -> Result<Option<Group>, LedgerError>;
    async fn get_user_groups(&self, user_id: &str) -> Result<Vec<Group>, LedgerError>;

    async fn add_membership(&self, membership: Membership) -> Result<(), LedgerError>;
    async fn remove_membership(&self, group_id: &str, user_id: &str) -> Result<(), LedgerError>;
    /// Members in join order.
    async fn list_memberships(&self, group_id: &str) -> Result<Vec<Membership>, LedgerError>;
    async fn is_group_member(&self, group_id: &str, user_id: &str) -> Result<bool, LedgerError>;

    /// Reads the member set, builds the expense and writes it with all of its
    /// splits in one scope that excludes concurrent membership changes and
    /// other expense writes. Nothing is written if `build` fails.
    async fn record_expense(
        &self,
        group_id: &str,
        build: ExpenseBuilder,
    ) -> Result<ExpenseWithSplits, LedgerError>;
    async fn get_expense(&self, expense_id: &str) -> Result<Option<ExpenseWithSplits>, LedgerError>;
    /// Expenses in the order they were recorded.
    async fn list_group_expenses(&self, group_id: &str) -> Result<Vec<ExpenseWithSplits>, LedgerError>;
    async fn mark_split_paid(&self, expense_id: &str, user_id: &str) -> Result<SplitPayment, LedgerError>;

    async fn group_ledger(&self, group_id: &str) -> Result<Option<GroupLedger>, LedgerError>;
}

pub mod in_memory;
