//! API router with OpenAPI document

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::error::{panic_response, ErrorKind, FieldErrorBody, MessageBody, ValidationErrorBody};
use super::modules::health::{self, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;
use super::modules::transactions::{self, dto::StoreTransactionRequest, TransactionAppState};
use crate::application::TransactionService;

/// State shared by all API routes. Handlers pull their own slice of it via
/// `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<TransactionService>,
    pub started_at: Arc<Instant>,
    pub max_body_bytes: usize,
    pub metrics: Option<PrometheusHandle>,
}

impl ApiState {
    pub fn new(service: Arc<TransactionService>, max_body_bytes: usize) -> Self {
        Self {
            service,
            started_at: Arc::new(Instant::now()),
            max_body_bytes,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl FromRef<ApiState> for TransactionAppState {
    fn from_ref(s: &ApiState) -> Self {
        TransactionAppState {
            service: Arc::clone(&s.service),
        }
    }
}

impl FromRef<ApiState> for HealthState {
    fn from_ref(s: &ApiState) -> Self {
        HealthState {
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::health_check,
        transactions::handlers::store_transaction,
    ),
    components(schemas(
        StoreTransactionRequest,
        ValidationErrorBody,
        FieldErrorBody,
        ErrorKind,
        MessageBody,
        health::HealthResponse,
    )),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Transactions", description = "Validated transaction ingestion")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full API router.
pub fn create_api_router(state: ApiState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/v1/transactions",
            post(transactions::store_transaction)
                .layer(DefaultBodyLimit::max(state.max_body_bytes)),
        )
        .route("/api-doc/openapi.json", get(openapi_json))
        .with_state(state.clone());

    if let Some(handle) = state.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    with_common_layers(router)
}

/// Middleware applied to every route.
///
/// Panics are converted closest to the handler, so the outer layers still
/// log, count and tag the resulting 500.
pub fn with_common_layers(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
