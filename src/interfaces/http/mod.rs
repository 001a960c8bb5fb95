//! HTTP REST API interfaces
//!
//! - `common`: the validating body extractor
//! - `error`: error bodies and the outcome → response mapping
//! - `modules`: route handlers and middleware
//! - `router`: API router with OpenAPI document

pub mod common;
pub mod error;
pub mod modules;
pub mod router;

pub use error::{respond, ApiError, ResponseBody};
pub use router::{create_api_router, ApiDoc, ApiState};
