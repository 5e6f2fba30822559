//! Crop Yield Predictor Library
//!
//! Interactive crop yield prediction from remote-sensing and agronomic
//! features, served by a random forest or a neural regressor downloaded
//! as pre-trained artifacts.

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pages;
pub mod provisioner;
pub mod types;

pub use config::AppConfig;
pub use dispatcher::PredictorDispatcher;
pub use error::{AppError, LoadError, PredictionError, ValidationError};
pub use models::ModelBundle;
pub use provisioner::{ArtifactFetcher, HttpFetcher, ModelProvisioner};
pub use types::{features::FeatureVector, prediction::ModelKind};
