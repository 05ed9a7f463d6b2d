//! AGV Health Scoring Server
//!
//! HTTP surface over the windowed inference engines.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    AGV HEALTH SCORING                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────────────────────────────┐  │
//! │  │  API      │   │  Engines (one per manifest)          │  │
//! │  │  (Axum)   │──▶│  schema → window → scale → model     │  │
//! │  └───────────┘   └──────────────────┬───────────────────┘  │
//! │                                     ▼                      │
//! │                          ┌────────────────────┐            │
//! │                          │  MODEL_DIR (ONNX)  │            │
//! │                          └────────────────────┘            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;


use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agv_health_core::logic::model::load_engine;
use agv_health_core::InferenceEngine;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "agv_health_scoring=debug,agv_health_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("AGV Health Scoring Server starting ({})...", config.environment);
    tracing::info!("Model directory: {}", config.model_dir.display());

    let engines = load_engines(&config);
    if engines.is_empty() {
        anyhow::bail!(
            "none of the configured models ({}) could be loaded",
            config.models.join(", ")
        );
    }

    // Build application state
    let state = AppState {
        engines: Arc::new(engines),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load every configured model; failures are logged and skipped
fn load_engines(config: &config::Config) -> HashMap<String, Arc<InferenceEngine>> {
    let mut engines = HashMap::new();

    for name in &config.models {
        match load_engine(&config.model_dir, name) {
            Ok(engine) => {
                tracing::info!(model = %name, history = engine.history(), "Model loaded");
                engines.insert(name.clone(), Arc::new(engine));
            }
            Err(e) => tracing::error!(model = %name, "Failed to load model: {}", e),
        }
    }

    engines
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engines: Arc<HashMap<String, Arc<InferenceEngine>>>,
    pub config: config::Config,
}

impl AppState {
    pub fn engine(&self, name: &str) -> AppResult<Arc<InferenceEngine>> {
        self.engines
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Model '{}' not loaded", name)))
    }

    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.engines.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/v1/models", get(handlers::models::list))
        .route("/api/v1/models/:name", get(handlers::models::get))
        .route("/api/v1/models/:name/score", post(handlers::score::score))
        .route("/api/v1/models/:name/step", post(handlers::score::step))
        .route(
            "/api/v1/models/:name/sessions/:agv_id",
            delete(handlers::score::end_session),
        );

    let cors = if state.config.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
