//! Claim Denial Risk API Server
//!
//! Real-time claim denial risk scoring over HTTP. The fitted pipeline is
//! loaded once at startup and shared read-only by every request.

use app_config::{AppConfig, RateLimitConfig};
use axum::{
    routing::{get, post},
    Router,
};
use inference_engine::InferenceEngine;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
pub mod rate_limit;
pub mod routes;

pub use error::ApiError;
pub use routes::health::{HealthResponse, ROOT_STATUS};
pub use routes::predict::{ClaimRequest, PredictResponse};

/// Application state shared across handlers
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub version: String,
    pub start_time: Instant,
    /// Prometheus handle, when this process installed the recorder
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(engine: Arc<InferenceEngine>) -> Self {
        Self {
            engine,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::health::root))
        .route("/api/v1/health", get(routes::health::health_handler))
        .route("/metrics", get(routes::health::metrics_handler))
        .route("/predict", post(routes::predict::predict_claim_denial))
        .with_state(state)
}

/// Router wrapped in request tracing and per-IP rate limiting.
///
/// Must be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_app(state: Arc<AppState>, rate_limit: &RateLimitConfig) -> Result<Router, ApiError> {
    let governor = rate_limit::create_governor_config(rate_limit)?;
    Ok(create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(GovernorLayer { config: governor }),
    ))
}

/// Install the global Prometheus recorder. Call once per process.
pub fn init_metrics() -> Result<PrometheusHandle, ApiError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ApiError::Startup(format!("metrics recorder: {}", e)))
}

/// Load the model and serve until Ctrl-C
pub async fn run_server(config: &AppConfig) -> Result<(), ApiError> {
    let model_path = config.paths.model_path();
    let engine = InferenceEngine::load(&model_path, config.model.decision_threshold)?;
    let state = AppState::new(Arc::new(engine)).with_metrics(init_metrics()?);
    let app = create_app(Arc::new(state), &config.server.rate_limit)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("Starting API server on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // no signal handler; run until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
