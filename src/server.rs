//! Reusable server runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, store,
//! service, HTTP listener and graceful shutdown. The CLI binary and the
//! black-box tests both start the service through it.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::TransactionService;
use crate::config::AppConfig;
use crate::infrastructure::InMemoryTransactionStore;
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::shutdown::{listen_for_shutdown_signals, ShutdownSignal};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install Prometheus recorder: {0}")]
    Metrics(String),
}

/// Options for starting the service.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    pub config: AppConfig,
}

/// Handle to a running service.
///
/// # Examples
///
/// ```rust,no_run
/// use txn_ingest::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Address the listener actually bound (useful with port 0).
    pub local_addr: SocketAddr,
    /// The store behind the ingestion endpoint.
    pub store: Arc<InMemoryTransactionStore>,
    /// The configuration the server was started with.
    pub config: AppConfig,

    shutdown: ShutdownSignal,
    api_task: JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, ServerError> {
        let config = opts.config;

        info!("Starting transaction ingestion service...");

        let store = Arc::new(match config.storage.capacity {
            Some(capacity) => {
                info!("In-memory store capacity: {}", capacity);
                InMemoryTransactionStore::with_capacity(capacity)
            }
            None => InMemoryTransactionStore::new(),
        });
        let service = Arc::new(TransactionService::new(store.clone()));

        let mut state = ApiState::new(service, config.server.max_body_bytes);
        if config.metrics.enabled {
            state = state.with_metrics(prometheus_handle()?);
        }
        let router = create_api_router(state);

        let address = config.server.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { address, source })?;
        info!("REST API listening on http://{}", local_addr);

        let shutdown = ShutdownSignal::new();
        let api_shutdown = shutdown.clone();
        let api_task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                api_shutdown.wait().await;
                info!("REST API server received shutdown signal");
            });
            if let Err(e) = server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            local_addr,
            store,
            config,
            shutdown,
            api_task,
        })
    }

    /// Trigger shutdown on SIGINT / SIGTERM.
    pub fn install_signal_handler(&self) {
        tokio::spawn(listen_for_shutdown_signals(self.shutdown.clone()));
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Trigger shutdown and wait for in-flight requests to drain.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        self.wait().await;
    }

    /// Wait for the server task to finish after a shutdown signal.
    ///
    /// Draining is bounded by `server.shutdown_timeout`; past that the task
    /// is aborted.
    pub async fn wait(mut self) {
        self.shutdown.wait().await;

        let timeout = Duration::from_secs(self.config.server.shutdown_timeout);
        info!("Draining in-flight requests (timeout: {}s)...", timeout.as_secs());

        match tokio::time::timeout(timeout, &mut self.api_task).await {
            Ok(Ok(())) => info!("REST API server stopped"),
            Ok(Err(e)) => error!("REST API server task panicked: {}", e),
            Err(_) => {
                warn!("Graceful shutdown timed out after {}s", timeout.as_secs());
                self.api_task.abort();
            }
        }
    }
}

/// The global metrics recorder can only be installed once per process;
/// later starts reuse the first handle.
fn prometheus_handle() -> Result<PrometheusHandle, ServerError> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;
    info!("Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level`; `logging.format = "json"` switches
/// to structured output.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
