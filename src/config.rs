//! Configuration management for the crop yield predictor

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub models: ModelsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A model artifact: local file name plus the remote location it is fetched from
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ArtifactSource {
    /// File name inside the models directory
    pub file: String,
    /// Download URL; artifacts without one are only used when already present
    #[serde(default)]
    pub url: Option<String>,
}

impl ArtifactSource {
    pub fn new(file: &str, url: Option<&str>) -> Self {
        Self {
            file: file.to_string(),
            url: url.map(str::to_string),
        }
    }

    /// Local path of this artifact under `dir`
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.file)
    }
}

/// ML artifacts configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory the artifacts are downloaded into and loaded from
    pub models_dir: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
    /// Random forest regressor
    pub ensemble: ArtifactSource,
    /// Neural regressor, ONNX export
    pub neural: ArtifactSource,
    /// Neural regressor, dense-layer JSON export
    pub neural_fallback: ArtifactSource,
    /// Feature standardization
    pub scaler: ArtifactSource,
}

fn default_onnx_threads() -> usize {
    1
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

/// Same values as the shipped `config/config.toml`. The remote locations
/// must hold JSON and ONNX exports; artifacts already in `models_dir` (for
/// example from `generate-demo-artifacts`) are never downloaded.
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models: ModelsConfig {
                models_dir: "models".to_string(),
                onnx_threads: 1,
                ensemble: ArtifactSource::new(
                    "rf_model.json",
                    Some("https://drive.google.com/uc?export=download&id=1GmKSsV98X3k5vNSQPmPtRErIYiA1t9r6"),
                ),
                neural: ArtifactSource::new(
                    "crop_yield_model.onnx",
                    Some("https://drive.google.com/uc?export=download&id=1qU_4mzVdWyadC_JMGF1ow2CfrVODIwdX"),
                ),
                neural_fallback: ArtifactSource::new("crop_yield_model.json", None),
                scaler: ArtifactSource::new(
                    "crop_yield_scaler.json",
                    Some("https://drive.google.com/uc?export=download&id=1zuKL1JQPHjVsQY9TBeHLpOxKi3PbDhRx"),
                ),
            },
            logging: LoggingConfig::default(),
        }
    }
}
