//! Transaction ingestion service

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::domain::{StorageFailure, Transaction, TransactionStore};

/// Hands validated transactions to the store and records the outcome.
pub struct TransactionService {
    store: Arc<dyn TransactionStore>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Store one transaction.
    ///
    /// Makes exactly one call to the store. The failure detail is logged
    /// here and then travels on inside the error for the HTTP layer, which
    /// does not echo it.
    pub async fn record(&self, transaction: Transaction) -> Result<(), StorageFailure> {
        debug!(item = %transaction.item(), cost = transaction.cost(), "Storing transaction");

        match self.store.store(transaction).await {
            Ok(()) => {
                metrics::counter!("transactions_recorded_total", "outcome" => "stored")
                    .increment(1);
                info!("Transaction stored");
                Ok(())
            }
            Err(failure) => {
                let outcome = match failure {
                    StorageFailure::Rejected(_) => "rejected",
                    StorageFailure::Unavailable(_) => "unavailable",
                };
                metrics::counter!("transactions_recorded_total", "outcome" => outcome).increment(1);
                error!(error = %failure, "Failed to store transaction");
                Err(failure)
            }
        }
    }
}
