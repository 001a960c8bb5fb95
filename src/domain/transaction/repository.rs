//! Transaction storage interface

use async_trait::async_trait;

use super::model::Transaction;
use crate::domain::error::StorageFailure;

/// Persists validated transactions.
///
/// The ingestion endpoint calls [`store`](TransactionStore::store) at most
/// once per request and maps the verdict straight to a response; it never
/// retries.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn store(&self, transaction: Transaction) -> Result<(), StorageFailure>;
}
