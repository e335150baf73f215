use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single proposed payment between two members.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

/// A [`Transfer`] with both ends resolved to display names.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SettlementTransfer {
    pub from: String,
    pub from_name: String,
    pub to: String,
    pub to_name: String,
    pub amount: f64,
}
