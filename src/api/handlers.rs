use crate::{
    api::models::*,
    core::{
        models::{
            audit::AppLog,
            expense::ExpenseWithSplits,
            group::{Group, Membership},
            settlement::SettlementTransfer,
            summary::GroupSummary,
            user::User,
        },
        services::LedgerService,
    },
    infrastructure::{logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use std::sync::Arc;

pub type AppService = LedgerService<InMemoryLogging, InMemoryStorage>;
pub type AppState = Arc<AppService>;

// Define API routes
pub fn api_routes(service: AppState) -> Router {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/{user_id}", get(get_user))
        .route("/users/{user_id}/groups", get(list_user_groups))
        .route("/groups", post(create_group))
        .route("/groups/join", post(join_group))
        .route("/groups/{group_id}", get(get_group_summary))
        .route("/groups/{group_id}/leave", post(leave_group))
        .route("/groups/{group_id}/members", get(list_group_members))
        .route(
            "/groups/{group_id}/expenses",
            post(record_group_expense).get(list_group_expenses),
        )
        .route("/groups/{group_id}/balances", get(get_group_balances))
        .route("/groups/{group_id}/settlements", get(get_group_settlement))
        .route("/groups/{group_id}/logs", get(get_group_logs))
        .route("/expenses/{expense_id}", get(get_expense))
        .route(
            "/expenses/{expense_id}/splits/{user_id}/settle",
            post(settle_split),
        )
        .route("/logs", get(get_app_logs))
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 409, description = "Username or email already taken", body = ErrorResponse)
    )
)]
pub(crate) async fn register_user(
    State(service): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = service.register_user(req.username, req.email).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(("user_id" = String, Path, description = "ID of the user to retrieve")),
    responses(
        (status = 200, description = "User retrieved", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_user(
    State(service): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(service.get_user(&user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/groups",
    params(("user_id" = String, Path, description = "ID of the user")),
    responses(
        (status = 200, description = "Groups the user belongs to", body = Vec<Group>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn list_user_groups(
    State(service): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Group>>, ApiError> {
    Ok(Json(service.list_user_groups(&user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Creator not found", body = ErrorResponse)
    )
)]
pub(crate) async fn create_group(
    State(service): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let group = service.create_group(req.name, &req.created_by_id).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    post,
    path = "/api/groups/join",
    request_body = JoinGroupRequest,
    responses(
        (status = 200, description = "Joined group", body = Membership),
        (status = 400, description = "Malformed invite code", body = ErrorResponse),
        (status = 404, description = "Unknown invite code or user", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    )
)]
pub(crate) async fn join_group(
    State(service): State<AppState>,
    Json(req): Json<JoinGroupRequest>,
) -> Result<Json<Membership>, ApiError> {
    Ok(Json(service.join_group_by_code(&req.invite_code, &req.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}",
    params(("group_id" = String, Path, description = "ID of the group")),
    responses(
        (status = 200, description = "Group summary with balances and settlements", body = GroupSummary),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_group_summary(
    State(service): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupSummary>, ApiError> {
    Ok(Json(service.group_summary(&group_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/leave",
    params(("group_id" = String, Path, description = "ID of the group")),
    request_body = LeaveGroupRequest,
    responses(
        (status = 204, description = "Left group"),
        (status = 400, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn leave_group(
    State(service): State<AppState>,
    Path(group_id): Path<String>,
    Json(req): Json<LeaveGroupRequest>,
) -> Result<StatusCode, ApiError> {
    service.leave_group(&group_id, &req.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/members",
    params(("group_id" = String, Path, description = "ID of the group")),
    responses(
        (status = 200, description = "Members in join order", body = Vec<Membership>),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn list_group_members(
    State(service): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<Membership>>, ApiError> {
    Ok(Json(service.list_group_members(&group_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/expenses",
    params(("group_id" = String, Path, description = "ID of the group")),
    request_body = RecordExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded and split equally", body = ExpenseWithSplits),
        (status = 400, description = "Invalid amount or payer not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn record_group_expense(
    State(service): State<AppState>,
    Path(group_id): Path<String>,
    Json(req): Json<RecordExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseWithSplits>), ApiError> {
    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let expense = service
        .record_group_expense_detailed(&group_id, &req.paid_by_id, req.amount, req.title, req.description, date)
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/expenses",
    params(("group_id" = String, Path, description = "ID of the group")),
    responses(
        (status = 200, description = "Expenses with splits in recording order", body = Vec<ExpenseWithSplits>),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn list_group_expenses(
    State(service): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<ExpenseWithSplits>>, ApiError> {
    Ok(Json(service.list_group_expenses(&group_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/balances",
    params(("group_id" = String, Path, description = "ID of the group")),
    responses(
        (status = 200, description = "Signed balance per member", body = BalancesResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_group_balances(
    State(service): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<BalancesResponse>, ApiError> {
    let balances = service.compute_balances(&group_id).await?;
    Ok(Json(BalancesResponse { group_id, balances }))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/settlements",
    params(("group_id" = String, Path, description = "ID of the group")),
    responses(
        (status = 200, description = "Transfers that settle the group", body = Vec<SettlementTransfer>),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_group_settlement(
    State(service): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<SettlementTransfer>>, ApiError> {
    Ok(Json(service.compute_group_settlement(&group_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/expenses/{expense_id}",
    params(("expense_id" = String, Path, description = "ID of the expense")),
    responses(
        (status = 200, description = "Expense with splits", body = ExpenseWithSplits),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_expense(
    State(service): State<AppState>,
    Path(expense_id): Path<String>,
) -> Result<Json<ExpenseWithSplits>, ApiError> {
    Ok(Json(service.get_expense(&expense_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/expenses/{expense_id}/splits/{user_id}/settle",
    params(
        ("expense_id" = String, Path, description = "ID of the expense"),
        ("user_id" = String, Path, description = "Member whose share is paid")
    ),
    responses(
        (status = 204, description = "Share marked as paid (idempotent)"),
        (status = 404, description = "Expense or split not found", body = ErrorResponse)
    )
)]
pub(crate) async fn settle_split(
    State(service): State<AppState>,
    Path((expense_id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    service.settle_split(&expense_id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses((status = 200, description = "Audit log of ledger actions", body = Vec<AppLog>))
)]
pub(crate) async fn get_app_logs(State(service): State<AppState>) -> Result<Json<Vec<AppLog>>, ApiError> {
    Ok(Json(service.get_app_logs().await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/logs",
    params(("group_id" = String, Path, description = "ID of the group")),
    responses(
        (status = 200, description = "Audit entries for the group, oldest first", body = Vec<AppLog>),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_group_logs(
    State(service): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<AppLog>>, ApiError> {
    Ok(Json(service.get_group_logs(&group_id).await?))
}
