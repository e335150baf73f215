use super::group::Group;
use super::settlement::SettlementTransfer;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberSummary {
    pub user_id: String,
    pub display_name: String,
    pub total_paid: f64,
    pub expense_count: usize,
    pub balance: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupSummary {
    pub group: Group,
    pub member_count: usize,
    pub total_expense: f64,
    pub fair_share: f64,
    pub members: Vec<MemberSummary>,
    pub settlements: Vec<SettlementTransfer>,
}
