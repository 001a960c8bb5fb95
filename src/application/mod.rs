//! Application layer: request validation and the ingestion service.

pub mod services;
pub mod validation;

pub use services::TransactionService;
pub use validation::{validate_transaction, FieldError, ValidationError};
