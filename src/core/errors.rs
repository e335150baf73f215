use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

/// How a caller should react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; the caller must correct it before trying again.
    Validation,
    /// A referenced group, user, expense or split does not exist.
    NotFound,
    /// The request collides with existing state.
    Conflict,
    /// Persistence failed. Never retried by the ledger itself.
    Storage,
}

#[derive(Error, Debug, Clone, Serialize, PartialEq)]
pub enum LedgerError {
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    #[error("Invalid amount {0}: must be a positive, finite value")]
    InvalidAmount(f64),
    #[error("User {0} is not a group member")]
    NotGroupMember(String),
    #[error("Invalid invite code: {0}")]
    InvalidInviteCode(String),
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Group {0} not found")]
    GroupNotFound(String),
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("Expense {0} not found")]
    ExpenseNotFound(String),
    #[error("No split of expense {expense_id} for user {user_id}")]
    SplitNotFound { expense_id: String, user_id: String },
    #[error("No group uses invite code {0}")]
    InviteCodeNotFound(String),

    #[error("User {0} is already a group member")]
    AlreadyGroupMember(String),
    #[error("Username {0} already taken")]
    UsernameTaken(String),
    #[error("Email {0} already registered")]
    EmailAlreadyRegistered(String),
    #[error("Invite code {0} already in use")]
    InviteCodeTaken(String),

    #[error("Split shares sum to {actual} but expense amount is {expected}")]
    InvalidSplit { expected: f64, actual: f64 },
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidInput(..)
            | LedgerError::InvalidAmount(_)
            | LedgerError::NotGroupMember(_)
            | LedgerError::InvalidInviteCode(_)
            | LedgerError::InvalidEmail(_) => ErrorKind::Validation,
            LedgerError::GroupNotFound(_)
            | LedgerError::UserNotFound(_)
            | LedgerError::ExpenseNotFound(_)
            | LedgerError::SplitNotFound { .. }
            | LedgerError::InviteCodeNotFound(_) => ErrorKind::NotFound,
            LedgerError::AlreadyGroupMember(_)
            | LedgerError::UsernameTaken(_)
            | LedgerError::EmailAlreadyRegistered(_)
            | LedgerError::InviteCodeTaken(_) => ErrorKind::Conflict,
            LedgerError::InvalidSplit { .. }
            | LedgerError::StorageError(_)
            | LedgerError::LoggingError(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn invalid_input(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        LedgerError::InvalidInput(
            field.to_string(),
            FieldError {
                field: field.to_string(),
                title: title.into(),
                description: description.into(),
            },
        )
    }
}
