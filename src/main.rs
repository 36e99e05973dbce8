mod routes;
mod controllers;
mod services;
mod models;
mod api_docs;
mod shared_state;
mod config;
mod error;

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::models::dataset::Dataset;
use crate::routes::advisor_routes::app_router;
use crate::shared_state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solar_advisor=info,tower_http=debug,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 1. Load configuration
    let config_path = std::env::var("SOLAR_ADVISOR_CONFIG")
        .unwrap_or_else(|_| "config.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("[CONFIG] Failed to load {}: {}", config_path, e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "[CONFIG] Loaded {} (reload_per_request={}, percent_denominator={:?})",
        config_path,
        config.dataset.reload_per_request,
        config.heatmap.percent_denominator
    );

    // 2. Reference tables are a required part of the deployment
    let dataset = match Dataset::load(&config.dataset) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("[DATASET] {}", e);
            std::process::exit(1);
        }
    };
    if dataset.is_empty() {
        tracing::warn!("[DATASET] {} has no cities; estimates will fail", config.dataset.cities_path);
    }
    if let Err(e) = dataset.panels() {
        tracing::warn!("[DATASET] {}; estimates will fail until the panel table is fixed", e);
    }

    // 3. Start HTTP server
    let port = config.port();
    let state = AppState::new(config, dataset);
    let app = app_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("API Server listening on http://{}", addr);
    tracing::info!("Scalar UI: http://{}/scalar", addr);

    if let Err(e) = axum_server::bind(addr).serve(app.into_make_service()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
