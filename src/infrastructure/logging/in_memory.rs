use crate::core::errors::LedgerError;
use crate::core::models::audit::AppLog;
use crate::infrastructure::logging::LoggingService;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;
use uuid::Uuid;

#[derive(Default)]
struct Journal {
    entries: Vec<AppLog>,
    // group id -> positions in `entries`
    by_group: HashMap<String, Vec<usize>>,
}

#[derive(Clone, Default)]
pub struct InMemoryLogging {
    journal: Arc<RwLock<Journal>>,
}

impl InMemoryLogging {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoggingService for InMemoryLogging {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<AppLog, LedgerError> {
        if !details.is_object() {
            return Err(LedgerError::LoggingError(format!(
                "details for {} must be a JSON object",
                action
            )));
        }
        let group_id = details
            .get("group_id")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let entry = AppLog {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            user_id: user_id.map(str::to_string),
            details,
            timestamp: Utc::now(),
        };

        let mut journal = self.journal.write().await;
        let position = journal.entries.len();
        journal.entries.push(entry.clone());
        if let Some(group_id) = group_id {
            journal.by_group.entry(group_id).or_default().push(position);
        }
        trace!("Audit entry {} stored at {}", entry.id, position);
        Ok(entry)
    }

    async fn get_logs(&self) -> Result<Vec<AppLog>, LedgerError> {
        Ok(self.journal.read().await.entries.clone())
    }

    async fn get_group_logs(&self, group_id: &str) -> Result<Vec<AppLog>, LedgerError> {
        let journal = self.journal.read().await;
        Ok(journal
            .by_group
            .get(group_id)
            .map(|positions| positions.iter().map(|&i| journal.entries[i].clone()).collect())
            .unwrap_or_default())
    }
}
