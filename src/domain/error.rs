//! Domain errors

use thiserror::Error;

/// Why the storage collaborator could not take a transaction.
///
/// The detail string is for logs only. HTTP responses carry a fixed message
/// per variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageFailure {
    /// The store refused this particular value.
    #[error("storage rejected transaction: {0}")]
    Rejected(String),

    /// The store cannot accept writes right now.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
