use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Group {
    pub id: String,
    pub name: String,
    /// Six characters from `A-Z0-9`, unique across groups.
    pub invite_code: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// A (group, user) pair. Unique per pair and never updated; only removed on leave.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Membership {
    pub group_id: String,
    pub user_id: String,
    pub joined_at: DateTime<Utc>,
}
