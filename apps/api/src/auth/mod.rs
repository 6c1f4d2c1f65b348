//! Accounts: signup, login and stateless session tokens.

pub mod handlers;
pub mod password;
pub mod token;
pub mod users;
