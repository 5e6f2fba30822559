//! Error types for model loading, prediction and the interactive session

use inquire::InquireError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to provision the model bundle. Fatal for the session.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{artifact} not found at {}", .path.display())]
    Missing {
        artifact: &'static str,
        path: PathBuf,
    },
    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },
    #[error("download from {url} returned an HTML page instead of the artifact")]
    UnexpectedHtml { url: String },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {artifact}: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },
    #[error("ONNX Runtime could not load {}: {message}", .path.display())]
    Onnx { path: PathBuf, message: String },
    #[error("neural model unavailable in either format (onnx: {primary}; dense: {fallback})")]
    NeuralFormats {
        primary: Box<LoadError>,
        fallback: Box<LoadError>,
    },
}

/// Failure of a single prediction. Reported to the user, the session continues.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("{model} expects {expected} features, got {actual}")]
    FeatureCount {
        model: String,
        expected: usize,
        actual: usize,
    },
    #[error("scaler transform failed: {0}")]
    Scaling(String),
    #[error("{model} inference failed: {message}")]
    Inference { model: String, message: String },
    #[error("{model} produced a non-finite prediction ({value})")]
    NonFinite { model: String, value: f64 },
}

/// Form input outside the accepted domain of a feature.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be a whole number, got {value}")]
    NotWhole { field: &'static str, value: f64 },
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}

/// Errors that end the interactive session.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Menu(#[from] InquireError),
    #[error("Loading failed: {0}")]
    Load(#[from] LoadError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neural_formats_lists_both_causes() {
        let err = LoadError::NeuralFormats {
            primary: Box::new(LoadError::Missing {
                artifact: "onnx neural model",
                path: PathBuf::from("models/crop_yield_model.onnx"),
            }),
            fallback: Box::new(LoadError::Invalid {
                artifact: "dense neural model",
                reason: "network has no layers".to_string(),
            }),
        };

        let message = err.to_string();
        assert!(message.contains("onnx neural model not found"));
        assert!(message.contains("network has no layers"));
    }
}
