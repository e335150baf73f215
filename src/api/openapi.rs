use utoipa::OpenApi;

use crate::{
    api::models::{
        BalancesResponse, CreateGroupRequest, ErrorResponse, JoinGroupRequest, LeaveGroupRequest,
        RecordExpenseRequest, RegisterUserRequest,
    },
    core::models::{
        audit::AppLog,
        expense::{ExpenseSplit, ExpenseWithSplits, GroupExpense},
        group::{Group, Membership},
        settlement::SettlementTransfer,
        summary::{GroupSummary, MemberSummary},
        user::User,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::register_user,
        super::handlers::get_user,
        super::handlers::list_user_groups,
        super::handlers::create_group,
        super::handlers::join_group,
        super::handlers::get_group_summary,
        super::handlers::leave_group,
        super::handlers::list_group_members,
        super::handlers::record_group_expense,
        super::handlers::list_group_expenses,
        super::handlers::get_group_balances,
        super::handlers::get_group_settlement,
        super::handlers::get_expense,
        super::handlers::settle_split,
        super::handlers::get_app_logs,
        super::handlers::get_group_logs
    ),
    components(schemas(
        RegisterUserRequest,
        CreateGroupRequest,
        JoinGroupRequest,
        LeaveGroupRequest,
        RecordExpenseRequest,
        BalancesResponse,
        ErrorResponse,
        User,
        Group,
        Membership,
        GroupExpense,
        ExpenseSplit,
        ExpenseWithSplits,
        SettlementTransfer,
        MemberSummary,
        GroupSummary,
        AppLog
    )),
    info(
        title = "Split Ledger API",
        description = "Shared group expenses, member balances and settlement plans",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
