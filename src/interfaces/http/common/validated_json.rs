//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` reads the `Content-Type` header and the raw body and
//! hands both to `T`'s validator. Unlike `axum::Json<T>` it never answers
//! with a plain-text rejection: every failure is an [`ApiError`] and goes
//! through the shared response mapping.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{header, StatusCode};

use crate::application::{validate_transaction, ValidationError};
use crate::domain::Transaction;
use crate::interfaces::http::error::ApiError;

/// Types that can be built from a raw request payload.
pub trait FromPayload: Sized {
    fn from_payload(content_type: Option<&str>, body: &[u8]) -> Result<Self, ValidationError>;
}

impl FromPayload for Transaction {
    fn from_payload(content_type: Option<&str>, body: &[u8]) -> Result<Self, ValidationError> {
        validate_transaction(content_type, body)
    }
}

/// An extractor that validates the request body into `T`.
///
/// # Usage
///
/// ```ignore
/// async fn handler(ValidatedJson(tx): ValidatedJson<Transaction>) {
///     // `tx` passed the schema
/// }
/// ```
///
/// Take `Result<ValidatedJson<T>, ApiError>` instead to handle rejections in
/// the handler.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: FromPayload,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Header bytes that are not visible ASCII still count as "declared",
        // they just cannot be JSON.
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge
            } else {
                ApiError::Validation(ValidationError::MalformedPayload {
                    detail: rejection.body_text(),
                })
            }
        })?;

        let value = T::from_payload(content_type.as_deref(), &body)?;
        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────
