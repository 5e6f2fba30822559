//! Yield regressors and the bundle they are served from

pub mod bundle;
pub mod forest;
pub mod loader;
pub mod neural;
pub mod scaler;

pub use bundle::ModelBundle;
pub use forest::RandomForest;
pub use loader::{ArtifactPaths, ModelLoader};
pub use neural::{DenseNetwork, OnnxRegressor};
pub use scaler::StandardScaler;

use crate::error::PredictionError;

/// A loaded model mapping one feature row to a scalar yield.
pub trait Regressor: Send + Sync {
    /// Short identifier used in logs and error messages
    fn name(&self) -> &str;

    /// Input width, when the model format records it
    fn n_features(&self) -> Option<usize>;

    fn predict(&self, features: &[f32]) -> Result<f64, PredictionError>;
}
