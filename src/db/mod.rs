//! Database access layer

pub mod balance;
pub mod orders;
pub mod users;
pub mod withdrawals;
