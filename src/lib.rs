//! # Transaction Ingestion Service
//!
//! HTTP service that accepts purchase transactions as JSON, validates them
//! against a fixed schema and hands the valid ones to a storage backend.
//!
//! ## Architecture
//!
//! - **domain**: `Transaction`, the storage port and its failure type
//! - **application**: request validation and the recording service
//! - **infrastructure**: the in-memory store
//! - **interfaces**: REST API (ingestion endpoint, health, metrics, OpenAPI)
//! - **server**: runtime lifecycle shared by the CLI and integration tests

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use application::{validate_transaction, TransactionService, ValidationError};
pub use domain::{StorageFailure, Transaction, TransactionStore};
pub use infrastructure::InMemoryTransactionStore;

// Re-export API router
pub use interfaces::http::{create_api_router, ApiState};
