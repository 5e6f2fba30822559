//! Neural yield regressors.
//!
//! The network ships in two formats: an ONNX graph run through ONNX Runtime,
//! and a dense-layer JSON export evaluated with `ndarray`. Both expect
//! standardized features.

use crate::error::{LoadError, PredictionError};
use crate::models::Regressor;
use ndarray::{Array1, Array2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Layer activation function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }
}

/// Serialized dense layer; `kernel` is `inputs × units`, as Keras stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayerArtifact {
    pub kernel: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

/// Serialized feed-forward network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseArtifact {
    pub layers: Vec<DenseLayerArtifact>,
}

struct DenseLayer {
    kernel: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

/// Feed-forward network evaluated in-process.
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Build from an export, checking that layer shapes chain and end in one unit.
    pub fn from_artifact(artifact: &DenseArtifact) -> Result<Self, String> {
        if artifact.layers.is_empty() {
            return Err("network has no layers".to_string());
        }

        let mut layers = Vec::with_capacity(artifact.layers.len());
        let mut expected_inputs: Option<usize> = None;

        for (i, layer) in artifact.layers.iter().enumerate() {
            let inputs = layer.kernel.len();
            let units = layer.kernel.first().map_or(0, Vec::len);
            if inputs == 0 || units == 0 {
                return Err(format!("layer {i} has an empty kernel"));
            }
            if layer.kernel.iter().any(|row| row.len() != units) {
                return Err(format!("layer {i} kernel rows differ in length"));
            }
            if layer.bias.len() != units {
                return Err(format!(
                    "layer {i} has {units} units but {} biases",
                    layer.bias.len()
                ));
            }
            if let Some(expected) = expected_inputs {
                if inputs != expected {
                    return Err(format!(
                        "layer {i} takes {inputs} inputs, previous layer has {expected} units"
                    ));
                }
            }
            expected_inputs = Some(units);

            let flat: Vec<f32> = layer.kernel.iter().flatten().copied().collect();
            let kernel = Array2::from_shape_vec((inputs, units), flat)
                .map_err(|e| format!("layer {i}: {e}"))?;
            layers.push(DenseLayer {
                kernel,
                bias: Array1::from(layer.bias.clone()),
                activation: layer.activation,
            });
        }

        if expected_inputs != Some(1) {
            return Err("final layer must have exactly one unit".to_string());
        }

        Ok(Self { layers })
    }

    fn input_width(&self) -> usize {
        self.layers[0].kernel.nrows()
    }
}

impl Regressor for DenseNetwork {
    fn name(&self) -> &str {
        "dense_network"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.input_width())
    }

    fn predict(&self, features: &[f32]) -> Result<f64, PredictionError> {
        if features.len() != self.input_width() {
            return Err(PredictionError::FeatureCount {
                model: self.name().to_string(),
                expected: self.input_width(),
                actual: features.len(),
            });
        }

        let mut x = Array1::from(features.to_vec());
        for layer in &self.layers {
            let mut z = x.dot(&layer.kernel) + &layer.bias;
            let activation = layer.activation;
            z.mapv_inplace(|v| activation.apply(v));
            x = z;
        }

        Ok(f64::from(x[0]))
    }
}

/// ONNX graph executed by ONNX Runtime
pub struct OnnxRegressor {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    path: PathBuf,
}

fn onnx_error(path: &Path, e: impl std::fmt::Display) -> LoadError {
    LoadError::Onnx {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

impl OnnxRegressor {
    /// Load an ONNX model from file
    pub fn load(path: &Path, onnx_threads: usize) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::Missing {
                artifact: "onnx neural model",
                path: path.to_path_buf(),
            });
        }

        info!(path = %path.display(), threads = onnx_threads, "Loading ONNX model");

        let session = Session::builder()
            .map_err(|e| onnx_error(path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| onnx_error(path, e))?
            .with_intra_threads(onnx_threads)
            .map_err(|e| onnx_error(path, e))?
            .commit_from_file(path)
            .map_err(|e| onnx_error(path, e))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| LoadError::Invalid {
                artifact: "onnx neural model",
                reason: "graph has no inputs".to_string(),
            })?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| LoadError::Invalid {
                artifact: "onnx neural model",
                reason: "graph has no outputs".to_string(),
            })?;

        info!(
            input = %input_name,
            output = %output_name,
            "ONNX model loaded successfully"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            path: path.to_path_buf(),
        })
    }

    fn inference_error(&self, message: impl ToString) -> PredictionError {
        PredictionError::Inference {
            model: self.name().to_string(),
            message: message.to_string(),
        }
    }
}

impl Regressor for OnnxRegressor {
    fn name(&self) -> &str {
        "onnx_network"
    }

    /// Input width is checked by ONNX Runtime at run time.
    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict(&self, features: &[f32]) -> Result<f64, PredictionError> {
        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .map_err(|e| self.inference_error(e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| self.inference_error("session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| self.inference_error(e))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| self.inference_error(format!("missing output {}", self.output_name)))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| self.inference_error(e))?;
        let value = data
            .first()
            .copied()
            .ok_or_else(|| self.inference_error("empty output tensor"))?;

        debug!(path = %self.path.display(), value = value, "ONNX inference complete");
        Ok(f64::from(value))
    }
}
