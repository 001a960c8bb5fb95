//! Extractors shared by HTTP handlers

mod validated_json;

pub use validated_json::{FromPayload, ValidatedJson};
