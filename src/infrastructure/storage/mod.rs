//! Transaction store implementations

mod memory;

pub use memory::{InMemoryTransactionStore, StoredTransaction};
