//! Application services

mod transaction;

pub use transaction::TransactionService;
