pub mod in_memory;

use crate::core::errors::LedgerError;
use crate::core::models::audit::AppLog;
use async_trait::async_trait;

/// Append-only audit trail of committed ledger changes.
#[async_trait]
pub trait LoggingService: Send + Sync {
    /// `details` must be a JSON object. A string `group_id` inside it files
    /// the entry under that group as well.
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<AppLog, LedgerError>;

    async fn get_logs(&self) -> Result<Vec<AppLog>, LedgerError>;

    async fn get_group_logs(&self, group_id: &str) -> Result<Vec<AppLog>, LedgerError>;
}
