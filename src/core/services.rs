use crate::core::balances::{Balances, compute_balances, paid_totals};
use crate::core::constants::{
    EXPENSE_RECORDED, GROUP_CREATED, INVITE_CODE_ALPHABET, INVITE_CODE_LENGTH, MAX_DESCRIPTION_LENGTH,
    MAX_EXPENSE_AMOUNT, MAX_GROUP_NAME_LENGTH, MAX_TITLE_LENGTH, MAX_USERNAME_LENGTH, MEMBER_JOINED, MEMBER_LEFT,
    SPLIT_SETTLED, USER_REGISTERED,
};
use crate::core::directory::MemberDirectory;
use crate::core::errors::LedgerError;
use crate::core::models::{
    audit::AppLog,
    expense::{ExpenseWithSplits, NewExpense, SplitPayment},
    group::{Group, Membership},
    settlement::{SettlementTransfer, Transfer},
    summary::{GroupSummary, MemberSummary},
    user::User,
};
use crate::core::settlement::plan_settlements;
use crate::core::splits::split_equally;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::{GroupLedger, Storage};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct LedgerService<L: LoggingService, S: Storage> {
    storage: S,
    logging: L,
}

impl<L: LoggingService, S: Storage> LedgerService<L, S> {
    pub fn new(storage: S, logging: L) -> Self {
        info!("Initializing LedgerService");
        LedgerService { storage, logging }
    }

    /// Audit records are written after the ledger change has committed, so a
    /// logging failure is reported but never undoes the change.
    async fn audit(&self, action: &str, details: serde_json::Value, user_id: Option<&str>) {
        if let Err(e) = self.logging.log_action(action, details, user_id).await {
            warn!("Failed to write audit record for {}: {}", action, e);
        }
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), LedgerError> {
        if value.trim().is_empty() {
            return Err(LedgerError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.chars().count() > max_length {
            return Err(LedgerError::invalid_input(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(LedgerError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    /// Free text keeps punctuation of any kind. Titles stay on one line;
    /// descriptions may also carry newlines and tabs.
    fn validate_text_input(
        &self,
        field: &str,
        value: &str,
        max_length: usize,
        multiline: bool,
    ) -> Result<(), LedgerError> {
        if value.trim().is_empty() {
            return Err(LedgerError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.chars().count() > max_length {
            return Err(LedgerError::invalid_input(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        let allowed = |c: char| multiline && (c == '\n' || c == '\t');
        if value.chars().any(|c| c.is_control() && !allowed(c)) {
            return Err(LedgerError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} contains control characters", field),
            ));
        }
        Ok(())
    }

    fn validate_amount_input(&self, field: &str, amount: f64) -> Result<(), LedgerError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if amount > MAX_EXPENSE_AMOUNT {
            return Err(LedgerError::invalid_input(
                field,
                "Amount Too Large",
                format!("Amount cannot exceed {}", MAX_EXPENSE_AMOUNT),
            ));
        }
        let cents = amount * 100.0;
        if (cents - cents.round()).abs() > 1e-6 {
            return Err(LedgerError::invalid_input(
                field,
                "Invalid Amount",
                "Amount cannot have more than 2 decimal places",
            ));
        }
        Ok(())
    }

    async fn require_group(&self, group_id: &str) -> Result<Group, LedgerError> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.to_string()))
    }

    async fn require_user(&self, user_id: &str) -> Result<User, LedgerError> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))
    }

    async fn require_ledger(&self, group_id: &str) -> Result<GroupLedger, LedgerError> {
        self.storage
            .group_ledger(group_id)
            .await?
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.to_string()))
    }

    // USERS

    pub async fn register_user(&self, username: String, email: String) -> Result<User, LedgerError> {
        let username = username.trim().to_string();
        self.validate_string_input("username", &username, MAX_USERNAME_LENGTH)?;
        let email = email.trim().to_lowercase();
        if email.len() < 5 || !email.contains('@') || !email.contains('.') {
            return Err(LedgerError::InvalidEmail(email));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            created_at: Utc::now(),
        };
        let created = self.storage.create_user(user).await?;
        debug!("User {} registered", created.id);

        self.audit(
            USER_REGISTERED,
            json!({ "user_id": created.id, "username": created.username }),
            Some(&created.id),
        )
        .await;
        Ok(created)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, LedgerError> {
        self.require_user(user_id).await
    }

    // GROUPS & MEMBERSHIP

    pub async fn create_group(&self, name: String, created_by: &str) -> Result<Group, LedgerError> {
        let name = name.trim().to_string();
        self.validate_string_input("name", &name, MAX_GROUP_NAME_LENGTH)?;
        self.require_user(created_by).await?;

        let group = loop {
            let now = Utc::now();
            let group = Group {
                id: Uuid::new_v4().to_string(),
                name: name.clone(),
                invite_code: random_invite_code(),
                created_by: created_by.to_string(),
                created_at: now,
            };
            let creator = Membership {
                group_id: group.id.clone(),
                user_id: created_by.to_string(),
                joined_at: now,
            };
            // The code is claimed inside the storage write, so a collision just draws again.
            match self.storage.create_group(group.clone(), creator).await {
                Ok(()) => break group,
                Err(LedgerError::InviteCodeTaken(code)) => debug!("Invite code {} taken, retrying", code),
                Err(e) => return Err(e),
            }
        };
        info!("Group {} created by {}", group.id, created_by);

        self.audit(
            GROUP_CREATED,
            json!({ "group_id": group.id, "name": group.name, "invite_code": group.invite_code }),
            Some(created_by),
        )
        .await;
        Ok(group)
    }

    pub async fn join_group_by_code(&self, code: &str, user_id: &str) -> Result<Membership, LedgerError> {
        let code = code.trim().to_uppercase();
        if code.len() != INVITE_CODE_LENGTH || !code.bytes().all(|b| INVITE_CODE_ALPHABET.contains(&b)) {
            warn!("Malformed invite code: {}", code);
            return Err(LedgerError::InvalidInviteCode(code));
        }
        self.require_user(user_id).await?;

        let group = self
            .storage
            .get_group_by_invite_code(&code)
            .await?
            .ok_or_else(|| LedgerError::InviteCodeNotFound(code.clone()))?;

        let membership = Membership {
            group_id: group.id.clone(),
            user_id: user_id.to_string(),
            joined_at: Utc::now(),
        };
        self.storage.add_membership(membership.clone()).await?;
        info!("User {} joined group {}", user_id, group.id);

        self.audit(
            MEMBER_JOINED,
            json!({ "group_id": group.id, "invite_code": code }),
            Some(user_id),
        )
        .await;
        Ok(membership)
    }

    /// Past splits of the leaving member are kept as they are.
    pub async fn leave_group(&self, group_id: &str, user_id: &str) -> Result<(), LedgerError> {
        self.storage.remove_membership(group_id, user_id).await?;
        info!("User {} left group {}", user_id, group_id);

        self.audit(MEMBER_LEFT, json!({ "group_id": group_id }), Some(user_id))
            .await;
        Ok(())
    }

    pub async fn list_user_groups(&self, user_id: &str) -> Result<Vec<Group>, LedgerError> {
        self.require_user(user_id).await?;
        self.storage.get_user_groups(user_id).await
    }

    pub async fn list_group_members(&self, group_id: &str) -> Result<Vec<Membership>, LedgerError> {
        self.require_group(group_id).await?;
        self.storage.list_memberships(group_id).await
    }

    pub async fn get_group(&self, group_id: &str) -> Result<Group, LedgerError> {
        self.require_group(group_id).await
    }

    // EXPENSES

    /// Records an expense split equally among the group's current members.
    ///
    /// The member set is read and the expense plus its splits are written in
    /// one storage write scope, so concurrent joins cannot produce a split set
    /// from a stale member count. Returns the new expense id.
    pub async fn record_group_expense(
        &self,
        group_id: &str,
        payer_id: &str,
        amount: f64,
        title: String,
        description: Option<String>,
        date: NaiveDate,
    ) -> Result<String, LedgerError> {
        Ok(self
            .record_group_expense_detailed(group_id, payer_id, amount, title, description, date)
            .await?
            .expense
            .id)
    }

    /// Same as [`record_group_expense`](Self::record_group_expense) but returns
    /// the stored expense with its splits.
    pub async fn record_group_expense_detailed(
        &self,
        group_id: &str,
        payer_id: &str,
        amount: f64,
        title: String,
        description: Option<String>,
        date: NaiveDate,
    ) -> Result<ExpenseWithSplits, LedgerError> {
        info!(
            "Recording expense in group {} paid by {} for amount {}",
            group_id, payer_id, amount
        );
        self.validate_amount_input("amount", amount)?;
        let title = title.trim().to_string();
        self.validate_text_input("title", &title, MAX_TITLE_LENGTH, false)?;
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(ref d) = description {
            self.validate_text_input("description", d, MAX_DESCRIPTION_LENGTH, true)?;
        }

        let draft = NewExpense {
            group_id: group_id.to_string(),
            paid_by: payer_id.to_string(),
            amount,
            title,
            description,
            date,
        };
        let created = self
            .storage
            .record_expense(
                group_id,
                Box::new(move |members: &[Membership]| split_equally(&draft, members, Utc::now())),
            )
            .await?;
        debug!(
            "Expense {} recorded with {} splits",
            created.expense.id,
            created.splits.len()
        );

        self.audit(
            EXPENSE_RECORDED,
            json!({
                "expense_id": created.expense.id,
                "group_id": group_id,
                "amount": created.expense.amount,
                "title": created.expense.title,
                "split_count": created.splits.len()
            }),
            Some(payer_id),
        )
        .await;
        Ok(created)
    }

    /// Marks a member's share of an expense as paid. Settling an already paid
    /// split is a no-op.
    pub async fn settle_split(&self, expense_id: &str, user_id: &str) -> Result<(), LedgerError> {
        match self.storage.mark_split_paid(expense_id, user_id).await? {
            SplitPayment::Settled { group_id } => {
                info!("Split of expense {} settled for user {}", expense_id, user_id);
                self.audit(
                    SPLIT_SETTLED,
                    json!({ "expense_id": expense_id, "group_id": group_id }),
                    Some(user_id),
                )
                .await;
            }
            SplitPayment::AlreadyPaid => {
                debug!("Split of expense {} for user {} already paid", expense_id, user_id);
            }
        }
        Ok(())
    }

    pub async fn get_expense(&self, expense_id: &str) -> Result<ExpenseWithSplits, LedgerError> {
        self.storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| LedgerError::ExpenseNotFound(expense_id.to_string()))
    }

    pub async fn list_group_expenses(&self, group_id: &str) -> Result<Vec<ExpenseWithSplits>, LedgerError> {
        self.require_group(group_id).await?;
        self.storage.list_group_expenses(group_id).await
    }

    // BALANCES & SETTLEMENT

    pub async fn compute_balances(&self, group_id: &str) -> Result<Balances, LedgerError> {
        let ledger = self.require_ledger(group_id).await?;
        let balances = compute_balances(&ledger.members, &ledger.expenses);
        debug!("Balances for group {}: {:?}", group_id, balances);
        Ok(balances)
    }

    /// Transfers between raw user ids.
    pub async fn plan_group_transfers(&self, group_id: &str) -> Result<Vec<Transfer>, LedgerError> {
        let balances = self.compute_balances(group_id).await?;
        Ok(plan_settlements(&balances))
    }

    pub async fn compute_group_settlement(&self, group_id: &str) -> Result<Vec<SettlementTransfer>, LedgerError> {
        let transfers = self.plan_group_transfers(group_id).await?;
        self.resolve_transfers(transfers).await
    }

    async fn resolve_transfers(&self, transfers: Vec<Transfer>) -> Result<Vec<SettlementTransfer>, LedgerError> {
        let mut resolved = Vec::with_capacity(transfers.len());
        for transfer in transfers {
            resolved.push(SettlementTransfer {
                from_name: self.storage.resolve_display_name(&transfer.from).await?,
                to_name: self.storage.resolve_display_name(&transfer.to).await?,
                from: transfer.from,
                to: transfer.to,
                amount: transfer.amount,
            });
        }
        Ok(resolved)
    }

    pub async fn group_summary(&self, group_id: &str) -> Result<GroupSummary, LedgerError> {
        let ledger = self.require_ledger(group_id).await?;
        let balances = compute_balances(&ledger.members, &ledger.expenses);

        let total_expense: f64 = ledger.expenses.iter().map(|e| e.expense.amount).sum();
        let member_count = ledger.members.len();
        let fair_share = if member_count > 0 {
            total_expense / member_count as f64
        } else {
            0.0
        };

        let mut members = Vec::with_capacity(member_count);
        for membership in &ledger.members {
            let (total_paid, expense_count) = paid_totals(&membership.user_id, &ledger.expenses);
            members.push(MemberSummary {
                display_name: self.storage.resolve_display_name(&membership.user_id).await?,
                total_paid,
                expense_count,
                balance: balances.get(&membership.user_id).copied().unwrap_or(0.0),
                user_id: membership.user_id.clone(),
            });
        }

        let settlements = self.resolve_transfers(plan_settlements(&balances)).await?;

        Ok(GroupSummary {
            group: ledger.group,
            member_count,
            total_expense,
            fair_share,
            members,
            settlements,
        })
    }

    // UTILITIES

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, LedgerError> {
        self.logging.get_logs().await
    }

    /// Audit entries that touched one group, oldest first.
    pub async fn get_group_logs(&self, group_id: &str) -> Result<Vec<AppLog>, LedgerError> {
        self.require_group(group_id).await?;
        self.logging.get_group_logs(group_id).await
    }
}

fn random_invite_code() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(INVITE_CODE_LENGTH)
        .map(|b| INVITE_CODE_ALPHABET[*b as usize % INVITE_CODE_ALPHABET.len()] as char)
        .collect()
}
