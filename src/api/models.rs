use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::error;
use utoipa::ToSchema;

use crate::core::errors::{ErrorKind, LedgerError};

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    pub created_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct JoinGroupRequest {
    pub invite_code: String,
    pub user_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LeaveGroupRequest {
    pub user_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RecordExpenseRequest {
    pub paid_by_id: String,
    pub amount: f64,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BalancesResponse {
    pub group_id: String,
    pub balances: BTreeMap<String, f64>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for LedgerError to implement IntoResponse
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Storage => {
                error!("Ledger storage failure: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}
