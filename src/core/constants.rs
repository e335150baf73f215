// Audit actions
pub const USER_REGISTERED: &str = "USER_REGISTERED";
pub const GROUP_CREATED: &str = "GROUP_CREATED";
pub const MEMBER_JOINED: &str = "MEMBER_JOINED";
pub const MEMBER_LEFT: &str = "MEMBER_LEFT";
pub const EXPENSE_RECORDED: &str = "EXPENSE_RECORDED";
pub const SPLIT_SETTLED: &str = "SPLIT_SETTLED";

/// Allowed gap between an expense amount and the sum of its shares.
pub const SPLIT_TOLERANCE: f64 = 1e-6;

/// Balances and transfers at or below this size are treated as settled.
pub const SETTLEMENT_EPSILON: f64 = 0.01;

pub const MAX_EXPENSE_AMOUNT: f64 = 1_000_000.0;

pub const INVITE_CODE_LENGTH: usize = 6;
pub const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const MAX_GROUP_NAME_LENGTH: usize = 100;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 255;
pub const MAX_USERNAME_LENGTH: usize = 15;
