//! Transaction API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use tracing::warn;

use super::dto::StoreTransactionRequest;
use crate::application::TransactionService;
use crate::domain::Transaction;
use crate::interfaces::http::common::ValidatedJson;
use crate::interfaces::http::error::{
    respond, ApiError, MessageBody, ResponseBody, ValidationErrorBody,
};

/// Transaction handler state
#[derive(Clone)]
pub struct TransactionAppState {
    pub service: Arc<TransactionService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    tag = "Transactions",
    request_body(content = StoreTransactionRequest, content_type = "application/json"),
    responses(
        (status = 201, description = "Transaction stored"),
        (status = 400, description = "Malformed payload, invalid fields, or rejected by storage", body = ValidationErrorBody),
        (status = 413, description = "Body larger than the configured limit", body = MessageBody),
        (status = 415, description = "Content type is not JSON", body = ValidationErrorBody),
        (status = 500, description = "Storage unavailable or internal error", body = MessageBody)
    )
)]
pub async fn store_transaction(
    State(state): State<TransactionAppState>,
    payload: Result<ValidatedJson<Transaction>, ApiError>,
) -> (StatusCode, ResponseBody) {
    let outcome = match payload {
        Ok(ValidatedJson(transaction)) => {
            state.service.record(transaction).await.map_err(ApiError::from)
        }
        Err(rejection) => {
            warn!(error = %rejection, "Rejected transaction payload");
            Err(rejection)
        }
    };
    respond(outcome)
}
