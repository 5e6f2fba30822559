//! Model artifact loader

use crate::config::ModelsConfig;
use crate::error::LoadError;
use crate::models::bundle::ModelBundle;
use crate::models::forest::{ForestArtifact, RandomForest};
use crate::models::neural::{DenseArtifact, DenseNetwork, OnnxRegressor};
use crate::models::scaler::StandardScaler;
use crate::models::Regressor;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Local paths of the four artifact files
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub ensemble: PathBuf,
    pub neural: PathBuf,
    pub neural_fallback: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    pub fn from_config(models: &ModelsConfig) -> Self {
        let dir = Path::new(&models.models_dir);
        Self {
            ensemble: models.ensemble.path_in(dir),
            neural: models.neural.path_in(dir),
            neural_fallback: models.neural_fallback.path_in(dir),
            scaler: models.scaler.path_in(dir),
        }
    }
}

/// Deserializes artifacts into in-memory predictors
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load the random forest regressor
    pub fn load_ensemble(&self, path: &Path) -> Result<RandomForest, LoadError> {
        info!(path = %path.display(), "Loading random forest");

        let artifact: ForestArtifact = read_json(path, "random forest")?;
        let forest = RandomForest::from_artifact(&artifact).map_err(|reason| {
            LoadError::Invalid {
                artifact: "random forest",
                reason,
            }
        })?;

        info!(
            trees = forest.n_trees(),
            features = artifact.n_features,
            "Random forest loaded successfully"
        );
        Ok(forest)
    }

    /// Load the neural regressor: ONNX first, the dense JSON export if that fails.
    ///
    /// Two formats are accepted for compatibility with older exports; neither
    /// is canonical yet.
    // TODO: settle on one neural export format and remove the fallback path.
    pub fn load_neural(
        &self,
        primary: &Path,
        fallback: &Path,
    ) -> Result<Box<dyn Regressor>, LoadError> {
        let primary_error = match OnnxRegressor::load(primary, self.onnx_threads) {
            Ok(model) => return Ok(Box::new(model)),
            Err(e) => e,
        };

        warn!(
            path = %primary.display(),
            fallback = %fallback.display(),
            error = %primary_error,
            "ONNX model unavailable, falling back to dense export"
        );

        match self.load_dense(fallback) {
            Ok(model) => Ok(Box::new(model)),
            Err(fallback_error) => Err(LoadError::NeuralFormats {
                primary: Box::new(primary_error),
                fallback: Box::new(fallback_error),
            }),
        }
    }

    fn load_dense(&self, path: &Path) -> Result<DenseNetwork, LoadError> {
        info!(path = %path.display(), "Loading dense network");

        let artifact: DenseArtifact = read_json(path, "dense neural model")?;
        let network = DenseNetwork::from_artifact(&artifact).map_err(|reason| {
            LoadError::Invalid {
                artifact: "dense neural model",
                reason,
            }
        })?;

        info!(
            layers = artifact.layers.len(),
            features = ?network.n_features(),
            "Dense network loaded successfully"
        );
        Ok(network)
    }

    /// Load the feature scaler
    pub fn load_scaler(&self, path: &Path) -> Result<StandardScaler, LoadError> {
        info!(path = %path.display(), "Loading scaler");

        let scaler: StandardScaler = read_json(path, "scaler")?;
        scaler.validate().map_err(|reason| LoadError::Invalid {
            artifact: "scaler",
            reason,
        })?;

        info!(features = scaler.n_features(), "Scaler loaded successfully");
        Ok(scaler)
    }

    /// Load all three models into a bundle
    pub fn load_bundle(&self, paths: &ArtifactPaths) -> Result<ModelBundle, LoadError> {
        let ensemble = self.load_ensemble(&paths.ensemble)?;
        let neural = self.load_neural(&paths.neural, &paths.neural_fallback)?;
        let scaler = self.load_scaler(&paths.scaler)?;

        info!(neural = %neural.name(), "Model bundle ready");

        Ok(ModelBundle::new(Box::new(ensemble), neural, scaler))
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, artifact: &'static str) -> Result<T, LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing {
            artifact,
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
