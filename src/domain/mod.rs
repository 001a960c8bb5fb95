//! Core domain: the `Transaction` entity and the port it is stored through.

pub mod error;
pub mod transaction;

pub use error::StorageFailure;
pub use transaction::{Transaction, TransactionStore};
