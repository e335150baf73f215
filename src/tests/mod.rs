mod expense_tests;
mod settlement_tests;

use crate::core::models::group::Group;
use crate::core::models::user::User;
use crate::core::services::LedgerService;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use chrono::NaiveDate;

pub type TestService = LedgerService<InMemoryLogging, InMemoryStorage>;

pub fn create_test_service() -> TestService {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    LedgerService::new(InMemoryStorage::new(), InMemoryLogging::new())
}

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub async fn register(service: &TestService, username: &str) -> User {
    service
        .register_user(username.to_string(), format!("{}@example.com", username.to_lowercase()))
        .await
        .unwrap()
}

/// Creates a group owned by the first user and joins the rest by invite code.
pub async fn group_with(service: &TestService, name: &str, users: &[&User]) -> Group {
    let (creator, rest) = users.split_first().unwrap();
    let group = service.create_group(name.to_string(), &creator.id).await.unwrap();
    for user in rest {
        service.join_group_by_code(&group.invite_code, &user.id).await.unwrap();
    }
    group
}

pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
