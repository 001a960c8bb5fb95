//! In-memory transaction store

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{StorageFailure, Transaction, TransactionStore};

/// A transaction as held by [`InMemoryTransactionStore`].
#[derive(Debug, Clone)]
pub struct StoredTransaction {
    pub id: Uuid,
    pub transaction: Transaction,
    pub stored_at: DateTime<Utc>,
}

/// Process-local store for development and testing.
///
/// Nothing survives a restart. With a capacity set, writes beyond it fail
/// with [`StorageFailure::Unavailable`].
pub struct InMemoryTransactionStore {
    transactions: DashMap<Uuid, StoredTransaction>,
    reserved: AtomicUsize,
    capacity: Option<usize>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
            reserved: AtomicUsize::new(0),
            capacity: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<StoredTransaction> {
        self.transactions.get(id).map(|entry| entry.clone())
    }

    /// All stored transactions, oldest first.
    pub fn list(&self) -> Vec<StoredTransaction> {
        let mut all: Vec<_> = self.transactions.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|stored| stored.stored_at);
        all
    }

    fn reserve_slot(&self) -> bool {
        match self.capacity {
            None => {
                self.reserved.fetch_add(1, Ordering::SeqCst);
                true
            }
            Some(capacity) => self
                .reserved
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    (n < capacity).then_some(n + 1)
                })
                .is_ok(),
        }
    }
}

impl Default for InMemoryTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn store(&self, transaction: Transaction) -> Result<(), StorageFailure> {
        if !self.reserve_slot() {
            let capacity = self.capacity.unwrap_or_default();
            warn!(capacity, "In-memory store is full");
            return Err(StorageFailure::Unavailable(format!(
                "in-memory capacity of {} transactions reached",
                capacity
            )));
        }

        let id = Uuid::new_v4();
        self.transactions.insert(
            id,
            StoredTransaction {
                id,
                transaction,
                stored_at: Utc::now(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::validation::validate_transaction;

    fn tx(item: &str, cost: f64) -> Transaction {
        let body = serde_json::json!({ "item": item, "cost": cost }).to_string();
        validate_transaction(Some("application/json"), body.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn stores_and_lists_transactions() {
        let store = InMemoryTransactionStore::new();
        assert!(store.is_empty());

        store.store(tx("bike", 5.0)).await.unwrap();
        store.store(tx("helmet", 1.25)).await.unwrap();

        assert_eq!(store.len(), 2);
        let items: Vec<_> = store
            .list()
            .into_iter()
            .map(|s| s.transaction.item().to_string())
            .collect();
        assert!(items.contains(&"bike".to_string()));
        assert!(items.contains(&"helmet".to_string()));

        let first = &store.list()[0];
        assert_eq!(store.get(&first.id).unwrap().transaction, first.transaction);
    }

    #[tokio::test]
    async fn full_store_is_unavailable() {
        let store = InMemoryTransactionStore::with_capacity(1);
        store.store(tx("bike", 5.0)).await.unwrap();

        let err = store.store(tx("bike", 5.0)).await.unwrap_err();
        assert!(matches!(err, StorageFailure::Unavailable(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn capacity_holds_under_concurrent_writes() {
        let store = Arc::new(InMemoryTransactionStore::with_capacity(10));

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.store(tx(&format!("item-{}", i), 1.0)).await })
            })
            .collect();

        let mut stored = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                stored += 1;
            }
        }

        assert_eq!(stored, 10);
        assert_eq!(store.len(), 10);
    }
}
