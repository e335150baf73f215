pub mod balances;
pub mod constants;
pub mod directory;
pub mod errors;
pub mod models;
pub mod services;
pub mod settlement;
pub mod splits;
