use crate::core::errors::LedgerError;
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use tracing::warn;

/// Read-only view of who belongs to which group and what they are called.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn resolve_display_name(&self, user_id: &str) -> Result<String, LedgerError>;
    async fn list_members(&self, group_id: &str) -> Result<Vec<String>, LedgerError>;
    async fn is_member(&self, group_id: &str, user_id: &str) -> Result<bool, LedgerError>;
}

#[async_trait]
impl<S: Storage> MemberDirectory for S {
    /// Falls back to the raw id for users missing from the directory.
    async fn resolve_display_name(&self, user_id: &str) -> Result<String, LedgerError> {
        match self.get_user(user_id).await? {
            Some(user) => Ok(user.username),
            None => {
                warn!("No directory entry for user {}", user_id);
                Ok(user_id.to_string())
            }
        }
    }

    async fn list_members(&self, group_id: &str) -> Result<Vec<String>, LedgerError> {
        Ok(self
            .list_memberships(group_id)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect())
    }

    async fn is_member(&self, group_id: &str, user_id: &str) -> Result<bool, LedgerError> {
        self.is_group_member(group_id, user_id).await
    }
}
