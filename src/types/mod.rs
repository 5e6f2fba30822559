//! Type definitions for the crop yield predictor

pub mod features;
pub mod prediction;

pub use features::{FeatureField, FeatureVector, FieldRange, FEATURE_COUNT};
pub use prediction::{ModelKind, PredictionReport};
