//! Churn Prediction Service - Main Entry Point
//!
//! Loads the ensemble model once, then serves the prediction form over HTTP.

use anyhow::{Context, Result};
use churn_predictor::{
    config::{AppConfig, LoggingConfig},
    metrics::{MetricsReporter, PredictionMetrics},
    models::OnnxEnsemble,
    predictor::ChurnPredictor,
    server::{self, AppState},
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    init_logging(&config.logging)?;
    info!("Starting Churn Prediction Service");
    info!("Configuration loaded successfully");

    let metrics = Arc::new(PredictionMetrics::new());

    // Model artifacts are loaded exactly once
    let classifier = Arc::new(OnnxEnsemble::new(&config.models)?);
    info!(models = ?classifier.model_names(), "Classifier ready");

    let predictor = Arc::new(ChurnPredictor::new(classifier));
    info!(
        "Feature extractor initialized ({} features)",
        predictor.feature_extractor().feature_count()
    );
    debug!(features = ?predictor.feature_extractor().feature_names(), "Model feature order");

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let state = AppState::new(
        predictor,
        metrics.clone(),
        config.server.strict_status_codes,
    );
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.address))?;
    info!(
        address = %config.server.address,
        strict_status_codes = config.server.strict_status_codes,
        "Listening for prediction requests"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("churn_predictor={}", logging.level).parse()?);

    match logging.format.as_str() {
        "json" => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        "pretty" => tracing_subscriber::fmt().with_env_filter(filter).init(),
        other => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            warn!(format = %other, "Unknown log format, using pretty");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
