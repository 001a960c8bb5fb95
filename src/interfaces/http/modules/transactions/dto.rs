//! Transaction DTOs

use serde::Deserialize;
use utoipa::ToSchema;

/// Request body of `POST /api/v1/transactions`.
///
/// Documentation only: the handler reads the raw body and validates it
/// itself so that every field problem can be reported at once.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreTransactionRequest {
    /// What was bought.
    #[schema(min_length = 1, max_length = 500, example = "bike")]
    pub item: String,
    /// What it cost.
    #[schema(minimum = 0.0, example = 5.0)]
    pub cost: f64,
}
