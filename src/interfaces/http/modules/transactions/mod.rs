pub mod dto;
pub mod handlers;

pub use handlers::{store_transaction, TransactionAppState};
