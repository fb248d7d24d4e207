//! NIRS Analytics Server
//!
//! HTTP boundary over the `nirs-core` pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        NIRS SERVER                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌──────────────────────────────────────┐  │
//! │  │  API       │──▶│  Pipeline                            │  │
//! │  │  (Axum)    │   │  Normalizer -> Stamper -> Dataset    │  │
//! │  └────────────┘   │  Anomaly/Graph Engine, Aggregator    │  │
//! │                   └──────────────────┬───────────────────┘  │
//! │                                      ▼                      │
//! │                          ┌────────────────────┐             │
//! │                          │ JSONL journal (opt)│             │
//! │                          └────────────────────┘             │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod handlers;
mod error;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use nirs_core::{DatasetStore, Pipeline, SeededNoise, Sha256Signer};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (core `log` records are bridged through tracing-log)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "nirs_server=debug,nirs_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("NIRS Server starting...");

    let pipeline = build_pipeline(&config)?;
    tracing::info!("Dataset: {} records loaded", pipeline.len());

    // Build application state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub config: config::Config,
}

/// Wire store, signer and forecast noise from configuration
fn build_pipeline(config: &config::Config) -> anyhow::Result<Pipeline> {
    let store = match &config.data_path {
        Some(path) => {
            tracing::info!("Dataset journal: {}", path.display());
            DatasetStore::open(path)
                .with_context(|| format!("failed to open dataset journal {}", path.display()))?
        }
        None => {
            tracing::info!("Dataset: in-memory (set DATA_PATH to persist)");
            DatasetStore::in_memory()
        }
    };

    let signer = match &config.signing_key {
        Some(key) => Sha256Signer::with_key(key),
        None => {
            if config.is_production() {
                tracing::warn!("SIGNING_KEY not set; record signatures are unkeyed");
            }
            Sha256Signer::new()
        }
    };

    let noise = match config.noise_seed {
        Some(seed) => SeededNoise::new(seed),
        None => SeededNoise::from_entropy(),
    };

    Ok(Pipeline::new(config.pipeline_config(), store, Arc::new(signer)).with_noise(Arc::new(noise)))
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let ingest_routes = Router::new()
        .route("/api/ingest", post(handlers::ingest::ingest))
        .route("/api/cross-border", post(handlers::ingest::cross_border));

    let query_routes = Router::new()
        .route("/api/data", get(handlers::data::list))
        .route("/api/data/:id/verify", get(handlers::data::verify));

    let analytics_routes = Router::new()
        .route("/api/digital-asset", post(handlers::digital_asset::analyze))
        .route("/api/anomalies", get(handlers::analytics::anomalies))
        .route("/api/kpis", get(handlers::analytics::kpis))
        .route("/api/forecast", get(handlers::analytics::forecast));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(ingest_routes)
        .merge(query_routes)
        .merge(analytics_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
