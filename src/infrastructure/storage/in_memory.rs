use crate::core::errors::LedgerError;
use crate::core::models::{
    expense::{ExpenseSplit, ExpenseWithSplits, GroupExpense, SplitPayment},
    group::{Group, Membership},
    user::User,
};
use crate::core::splits::check_split_sum;
use crate::infrastructure::storage::{ExpenseBuilder, GroupLedger, Storage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    groups: HashMap<String, Group>,
    groups_by_invite_code: HashMap<String, String>,
    memberships: Vec<Membership>,
    expenses: Vec<GroupExpense>,
    splits: HashMap<String, Vec<ExpenseSplit>>,
}

impl Tables {
    fn members_of(&self, group_id: &str) -> Vec<Membership> {
        self.memberships
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect()
    }

    fn is_member(&self, group_id: &str, user_id: &str) -> bool {
        self.memberships
            .iter()
            .any(|m| m.group_id == group_id && m.user_id == user_id)
    }

    fn with_splits(&self, expense: &GroupExpense) -> ExpenseWithSplits {
        ExpenseWithSplits {
            expense: expense.clone(),
            splits: self.splits.get(&expense.id).cloned().unwrap_or_default(),
        }
    }

    fn expenses_of(&self, group_id: &str) -> Vec<ExpenseWithSplits> {
        self.expenses
            .iter()
            .filter(|e| e.group_id == group_id)
            .map(|e| self.with_splits(e))
            .collect()
    }
}

/// Every table sits behind a single lock, so a write guard is a serializable
/// transaction and a read guard is a consistent snapshot.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_user(&self, user: User) -> Result<User, LedgerError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(LedgerError::UsernameTaken(user.username));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(LedgerError::EmailAlreadyRegistered(user.email));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, LedgerError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(user_id).cloned())
    }

    async fn create_group(&self, group: Group, creator: Membership) -> Result<(), LedgerError> {
        let mut tables = self.tables.write().await;
        if tables.groups_by_invite_code.contains_key(&group.invite_code) {
            return Err(LedgerError::InviteCodeTaken(group.invite_code));
        }
        if tables.groups.contains_key(&group.id) {
            return Err(LedgerError::StorageError(format!("group {} already exists", group.id)));
        }
        tables
            .groups_by_invite_code
            .insert(group.invite_code.clone(), group.id.clone());
        tables.groups.insert(group.id.clone(), group);
        tables.memberships.push(creator);
        Ok(())
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, LedgerError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.get(group_id).cloned())
    }

    async fn get_group_by_invite_code(&self, code: &str) -> Result<Option<Group>, LedgerError> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups_by_invite_code
            .get(code)
            .and_then(|group_id| tables.groups.get(group_id).cloned()))
    }

    async fn get_user_groups(&self, user_id: &str) -> Result<Vec<Group>, LedgerError> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| tables.groups.get(&m.group_id).cloned())
            .collect())
    }

    async fn add_membership(&self, membership: Membership) -> Result<(), LedgerError> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&membership.group_id) {
            return Err(LedgerError::GroupNotFound(membership.group_id));
        }
        if tables.is_member(&membership.group_id, &membership.user_id) {
            return Err(LedgerError::AlreadyGroupMember(membership.user_id));
        }
        tables.memberships.push(membership);
        Ok(())
    }

    async fn remove_membership(&self, group_id: &str, user_id: &str) -> Result<(), LedgerError> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(group_id) {
            return Err(LedgerError::GroupNotFound(group_id.to_string()));
        }
        let before = tables.memberships.len();
        tables
            .memberships
            .retain(|m| !(m.group_id == group_id && m.user_id == user_id));
        if tables.memberships.len() == before {
            return Err(LedgerError::NotGroupMember(user_id.to_string()));
        }
        Ok(())
    }

    async fn list_memberships(&self, group_id: &str) -> Result<Vec<Membership>, LedgerError> {
        let tables = self.tables.read().await;
        Ok(tables.members_of(group_id))
    }

    async fn is_group_member(&self, group_id: &str, user_id: &str) -> Result<bool, LedgerError> {
        let tables = self.tables.read().await;
        Ok(tables.is_member(group_id, user_id))
    }

    async fn record_expense(
        &self,
        group_id: &str,
        build: ExpenseBuilder,
    ) -> Result<ExpenseWithSplits, LedgerError> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(group_id) {
            return Err(LedgerError::GroupNotFound(group_id.to_string()));
        }

        let members = tables.members_of(group_id);
        let entry = build(members.as_slice())?;

        if entry.expense.group_id != group_id {
            return Err(LedgerError::StorageError(format!(
                "expense {} built for group {} instead of {}",
                entry.expense.id, entry.expense.group_id, group_id
            )));
        }
        if tables.splits.contains_key(&entry.expense.id) {
            return Err(LedgerError::StorageError(format!(
                "expense {} already exists",
                entry.expense.id
            )));
        }
        check_split_sum(&entry)?;

        tables.expenses.push(entry.expense.clone());
        tables.splits.insert(entry.expense.id.clone(), entry.splits.clone());
        Ok(entry)
    }

    async fn get_expense(&self, expense_id: &str) -> Result<Option<ExpenseWithSplits>, LedgerError> {
        let tables = self.tables.read().await;
        Ok(tables
            .expenses
            .iter()
            .find(|e| e.id == expense_id)
            .map(|e| tables.with_splits(e)))
    }

    async fn list_group_expenses(&self, group_id: &str) -> Result<Vec<ExpenseWithSplits>, LedgerError> {
        let tables = self.tables.read().await;
        Ok(tables.expenses_of(group_id))
    }

    async fn mark_split_paid(&self, expense_id: &str, user_id: &str) -> Result<SplitPayment, LedgerError> {
        let mut tables = self.tables.write().await;
        let group_id = tables
            .expenses
            .iter()
            .find(|e| e.id == expense_id)
            .map(|e| e.group_id.clone())
            .ok_or_else(|| LedgerError::ExpenseNotFound(expense_id.to_string()))?;
        let splits = tables
            .splits
            .get_mut(expense_id)
            .ok_or_else(|| LedgerError::ExpenseNotFound(expense_id.to_string()))?;
        let split = splits
            .iter_mut()
            .find(|s| s.user_id == user_id)
            .ok_or_else(|| LedgerError::SplitNotFound {
                expense_id: expense_id.to_string(),
                user_id: user_id.to_string(),
            })?;

        if split.is_paid {
            return Ok(SplitPayment::AlreadyPaid);
        }
        split.is_paid = true;
        Ok(SplitPayment::Settled { group_id })
    }

    async fn group_ledger(&self, group_id: &str) -> Result<Option<GroupLedger>, LedgerError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.get(group_id).cloned().map(|group| GroupLedger {
            group,
            members: tables.members_of(group_id),
            expenses: tables.expenses_of(group_id),
        }))
    }
}
