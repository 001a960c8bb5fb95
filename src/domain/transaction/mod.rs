//! Transaction aggregate
//!
//! Contains the Transaction entity and the storage port.

pub mod model;
pub mod repository;

pub use model::Transaction;
pub use repository::TransactionStore;
