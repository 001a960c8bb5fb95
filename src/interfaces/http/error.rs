//! HTTP error payloads and the outcome → response mapping.
//!
//! Every way a request can end (stored, invalid payload, storage failure,
//! oversize body, panic) goes through [`respond`], so all routes report
//! failures with the same statuses and body shapes.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::application::{FieldError, ValidationError};
use crate::domain::StorageFailure;

/// Anything that stops a request from ending in `201 Created`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageFailure),

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("internal server error")]
    Internal,
}

/// Which validation step rejected the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedMediaType,
    MalformedPayload,
    FieldInvalid,
}

/// A single field problem as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldErrorBody {
    #[schema(example = "item")]
    pub field: String,
    #[schema(example = "is required")]
    pub reason: String,
}

impl From<FieldError> for FieldErrorBody {
    fn from(e: FieldError) -> Self {
        Self {
            field: e.field,
            reason: e.reason,
        }
    }
}

/// Body of every validation failure.
///
/// `{"kind": "field_invalid", "errors": [{"field": "item", "reason": "is required"}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationErrorBody {
    pub kind: ErrorKind,
    pub errors: Vec<FieldErrorBody>,
}

/// Body of non-validation failures: `{"message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MessageBody {
    #[schema(example = "storage is unavailable")]
    pub message: String,
}

/// Response payload produced by [`respond`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Empty,
    Validation(ValidationErrorBody),
    Message(MessageBody),
}

impl IntoResponse for ResponseBody {
    fn into_response(self) -> Response {
        match self {
            Self::Empty => ().into_response(),
            Self::Validation(body) => Json(body).into_response(),
            Self::Message(body) => Json(body).into_response(),
        }
    }
}

/// Map a request outcome to its status and body.
///
/// Storage failure details are never copied into the body.
pub fn respond(outcome: Result<(), ApiError>) -> (StatusCode, ResponseBody) {
    match outcome {
        Ok(()) => (StatusCode::CREATED, ResponseBody::Empty),
        Err(ApiError::Validation(err)) => validation_failure(err),
        Err(ApiError::Storage(StorageFailure::Rejected(_))) => {
            message(StatusCode::BAD_REQUEST, "transaction was rejected by storage")
        }
        Err(ApiError::Storage(StorageFailure::Unavailable(_))) => {
            message(StatusCode::INTERNAL_SERVER_ERROR, "storage is unavailable")
        }
        Err(ApiError::PayloadTooLarge) => {
            message(StatusCode::PAYLOAD_TOO_LARGE, "payload too large")
        }
        Err(ApiError::Internal) => {
            message(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

fn validation_failure(err: ValidationError) -> (StatusCode, ResponseBody) {
    let (status, kind, errors) = match err {
        ValidationError::UnsupportedMediaType { content_type } => {
            let reason = if content_type.is_empty() {
                "missing; expected application/json".to_string()
            } else {
                format!("{} is not supported; expected application/json", content_type)
            };
            (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorKind::UnsupportedMediaType,
                vec![FieldErrorBody {
                    field: "content-type".to_string(),
                    reason,
                }],
            )
        }
        ValidationError::MalformedPayload { detail } => (
            StatusCode::BAD_REQUEST,
            ErrorKind::MalformedPayload,
            vec![FieldErrorBody {
                field: "body".to_string(),
                reason: detail,
            }],
        ),
        ValidationError::FieldInvalid(errors) => (
            StatusCode::BAD_REQUEST,
            ErrorKind::FieldInvalid,
            errors.into_iter().map(FieldErrorBody::from).collect(),
        ),
    };
    (
        status,
        ResponseBody::Validation(ValidationErrorBody { kind, errors }),
    )
}

fn message(status: StatusCode, text: &str) -> (StatusCode, ResponseBody) {
    (
        status,
        ResponseBody::Message(MessageBody {
            message: text.to_string(),
        }),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        respond(Err(self)).into_response()
    }
}

/// Panic handler for `CatchPanicLayer`: log the panic, answer with the
/// generic internal error body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = detail, "Request handler panicked");
    ApiError::Internal.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(body: ResponseBody) -> serde_json::Value {
        match body {
            ResponseBody::Empty => serde_json::Value::Null,
            ResponseBody::Validation(b) => serde_json::to_value(b).unwrap(),
            ResponseBody::Message(b) => serde_json::to_value(b).unwrap(),
        }
    }

    #[test]
    fn success_is_created_with_empty_body() {
        assert_eq!(respond(Ok(())), (StatusCode::CREATED, ResponseBody::Empty));
    }

    #[test]
    fn field_errors_keep_order_and_shape() {
        let (status, body) = respond(Err(ValidationError::FieldInvalid(vec![
            FieldError::new("item", "must be between 1 and 500 characters"),
            FieldError::new("cost", "must be greater than or equal to 0"),
        ])
        .into()));

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(body),
            serde_json::json!({
                "kind": "field_invalid",
                "errors": [
                    {"field": "item", "reason": "must be between 1 and 500 characters"},
                    {"field": "cost", "reason": "must be greater than or equal to 0"}
                ]
            })
        );
    }

    #[test]
    fn unsupported_media_type_names_the_header() {
        let (status, body) = respond(Err(ValidationError::UnsupportedMediaType {
            content_type: "text/plain".into(),
        }
        .into()));

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let json = body_json(body);
        assert_eq!(json["kind"], "unsupported_media_type");
        assert_eq!(json["errors"][0]["field"], "content-type");
        assert!(json["errors"][0]["reason"]
            .as_str()
            .unwrap()
            .starts_with("text/plain"));
    }

    #[test]
    fn malformed_payload_carries_parser_detail() {
        let (status, body) = respond(Err(ValidationError::MalformedPayload {
            detail: "expected value at line 1 column 1".into(),
        }
        .into()));

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json = body_json(body);
        assert_eq!(json["kind"], "malformed_payload");
        assert_eq!(json["errors"][0]["field"], "body");
        assert_eq!(json["errors"][0]["reason"], "expected value at line 1 column 1");
    }

    #[test]
    fn storage_failures_hide_detail() {
        let (status, body) = respond(Err(
            StorageFailure::Rejected("duplicate key users_pkey".into()).into()
        ));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(body),
            serde_json::json!({"message": "transaction was rejected by storage"})
        );

        let (status, body) = respond(Err(
            StorageFailure::Unavailable("connection refused 10.0.0.5:5432".into()).into(),
        ));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let text = body_json(body).to_string();
        assert!(!text.contains("10.0.0.5"));
        assert!(text.contains("storage is unavailable"));
    }

    #[test]
    fn internal_and_oversize_use_message_body() {
        assert_eq!(
            respond(Err(ApiError::Internal)).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let (status, body) = respond(Err(ApiError::PayloadTooLarge));
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(body), serde_json::json!({"message": "payload too large"}));
    }

    #[test]
    fn panic_response_does_not_leak_panic_text() {
        let response = panic_response(Box::new("secret token abc".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
