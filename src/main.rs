//! Crop Yield Predictor - Main Entry Point
//!
//! Interactive terminal demo: project and team pages, and a prediction form
//! served by a random forest or a neural regressor.

use anyhow::{Context, Result};
use crop_yield_predictor::{
    app::App,
    config::{AppConfig, LoggingConfig},
    error::AppError,
    provisioner::{HttpFetcher, ModelProvisioner},
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    // Logs go to stderr; stdout belongs to the interactive screen
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
    Ok(())
}

/// Error returned from `main`; the runtime prints it once, with its causes.
fn exit_error(e: AppError) -> anyhow::Error {
    match e {
        AppError::Load(e) => anyhow::Error::new(e).context("Loading failed"),
        other => other.into(),
    }
}

fn main() -> Result<()> {
    // Load configuration
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_logging(&config.logging)?;

    info!("Starting Crop Yield Predictor");
    match config_error {
        None => info!("Configuration loaded successfully"),
        Some(e) => warn!(error = %e, "Configuration unavailable, using built-in defaults"),
    }
    info!(
        models_dir = %config.models.models_dir,
        onnx_threads = config.models.onnx_threads,
        "Models are loaded on first prediction"
    );

    // Drives downloads and the one-time model load
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    let provisioner = ModelProvisioner::new(config.models.clone(), fetcher);

    let mut app = App::new(&runtime, &provisioner, PathBuf::from("."));
    let outcome = app.run();
    app.metrics().print_summary();

    match outcome {
        Ok(()) => {
            info!("Session ended");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Stopping session");
            Err(exit_error(e))
        }
    }
}
