//! Request validation
//!
//! Turns a raw request body plus its declared content type into a
//! [`Transaction`], or into a [`ValidationError`] listing every problem
//! found. Validation never panics, performs no I/O and gives the same answer
//! for the same input.
//!
//! Type checks (is `item` a string, is `cost` a number) happen while the
//! fields are pulled out of the JSON document. Length and range rules are
//! declared on [`TransactionDraft`] and enforced by `validator`.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::Transaction;

/// Schema fields in declaration order. Field errors are reported in this
/// order regardless of how the underlying map iterates.
const FIELDS: [&str; 2] = ["item", "cost"];

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending field (`item`, `cost`).
    pub field: String,
    /// Human readable explanation, e.g. `is required`.
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Why a request could not be turned into a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The declared content type is missing or is not JSON.
    #[error("unsupported media type: {content_type:?}")]
    UnsupportedMediaType { content_type: String },

    /// The body is not syntactically valid JSON.
    #[error("malformed payload: {detail}")]
    MalformedPayload { detail: String },

    /// One or more schema fields are missing or out of range.
    #[error("invalid fields: {}", describe(.0))]
    FieldInvalid(Vec<FieldError>),
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Fields as found in the document, before range and length checks.
#[derive(Debug, Default, Validate)]
struct TransactionDraft {
    #[validate(
        required(message = "is required"),
        length(min = 1, max = 500, message = "must be between 1 and 500 characters")
    )]
    item: Option<String>,

    #[validate(
        required(message = "is required"),
        range(min = 0.0, message = "must be greater than or equal to 0")
    )]
    cost: Option<f64>,
}

/// Whether `content_type` names a JSON media type.
///
/// Accepts `application/json` and any `application/<prefix>+json` with a
/// non-empty prefix, ignoring parameters such as `charset` and letter case.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };
    if !kind.eq_ignore_ascii_case("application") {
        return false;
    }
    let subtype = subtype.to_ascii_lowercase();
    match subtype.strip_suffix("+json") {
        Some(prefix) => !prefix.is_empty(),
        None => subtype == "json",
    }
}

/// Validate a raw request into a [`Transaction`].
///
/// `content_type` is the declared `Content-Type` header, if any. When it is
/// not JSON the body is not looked at.
pub fn validate_transaction(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Transaction, ValidationError> {
    let declared = content_type.unwrap_or_default();
    if !is_json_content_type(declared) {
        return Err(ValidationError::UnsupportedMediaType {
            content_type: declared.to_string(),
        });
    }

    let document: Value =
        serde_json::from_slice(body).map_err(|e| ValidationError::MalformedPayload {
            detail: e.to_string(),
        })?;

    let (draft, type_errors) = extract(&document);
    let rule_errors = match draft.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    let by_field = rule_errors.field_errors();

    let mut errors = Vec::new();
    for name in FIELDS {
        // A wrong type also leaves the draft field empty; report the type
        // problem, not a second "is required".
        if let Some(type_error) = type_errors.iter().find(|e| e.field == name) {
            errors.push(type_error.clone());
            continue;
        }
        if let Some(field_errors) = by_field.get(name) {
            errors.extend(
                field_errors
                    .iter()
                    .map(|e| FieldError::new(name, reason_of(e))),
            );
        }
    }

    match (draft.item, draft.cost) {
        // `-0.0` passes the range rule; store it as plain zero.
        (Some(item), Some(cost)) if errors.is_empty() => {
            Ok(Transaction::new_unchecked(item, cost + 0.0))
        }
        _ => Err(ValidationError::FieldInvalid(errors)),
    }
}

fn extract(document: &Value) -> (TransactionDraft, Vec<FieldError>) {
    let fields = document.as_object();
    let mut type_errors = Vec::new();

    let item = match present(fields, "item") {
        None => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            type_errors.push(FieldError::new("item", "must be a string"));
            None
        }
    };

    let cost = match present(fields, "cost").map(Value::as_f64) {
        None => None,
        Some(Some(number)) => Some(number),
        Some(None) => {
            type_errors.push(FieldError::new("cost", "must be a number"));
            None
        }
    };

    (TransactionDraft { item, cost }, type_errors)
}

/// Field lookup that treats an explicit `null` the same as absence.
fn present<'a>(fields: Option<&'a Map<String, Value>>, name: &str) -> Option<&'a Value> {
    fields
        .and_then(|map| map.get(name))
        .filter(|value| !value.is_null())
}

fn reason_of(error: &validator::ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

// ── Tests ──────────────────────────────────────────────────────
