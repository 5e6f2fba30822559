//! Prediction request and report data structures

use crate::types::features::FeatureVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which regressor serves a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Random forest on raw features
    Ensemble,
    /// Dense network on standardized features
    Neural,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Ensemble, ModelKind::Neural];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Ensemble => "Random Forest",
            ModelKind::Neural => "Deep Neural Network",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Successful prediction, as shown to the user
#[derive(Debug, Clone)]
pub struct PredictionReport {
    pub model: ModelKind,
    /// Predicted yield, tonnes per hectare
    pub yield_per_hectare: f64,
    pub features: FeatureVector,
    pub timestamp: DateTime<Utc>,
}

impl PredictionReport {
    pub fn new(model: ModelKind, yield_per_hectare: f64, features: FeatureVector) -> Self {
        Self {
            model,
            yield_per_hectare,
            features,
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for PredictionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Prediction Result")?;
        writeln!(f, "Model: {}", self.model)?;
        write!(
            f,
            "Predicted Yield: {:.1} Tonnes/Hectare",
            self.yield_per_hectare
        )
    }
}
