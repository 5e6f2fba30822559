//! Shared fixtures for integration tests

#![allow(dead_code)]

use crop_yield_predictor::config::{ArtifactSource, ModelsConfig};
use crop_yield_predictor::models::forest::{ForestArtifact, TreeArrays};
use crop_yield_predictor::models::neural::{Activation, DenseArtifact, DenseLayerArtifact};
use crop_yield_predictor::models::scaler::StandardScaler;
use crop_yield_predictor::provisioner::{write_atomically, ArtifactFetcher};
use crop_yield_predictor::LoadError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const FOREST_FILE: &str = "rf_model.json";
pub const ONNX_FILE: &str = "crop_yield_model.onnx";
pub const DENSE_FILE: &str = "crop_yield_model.json";
pub const SCALER_FILE: &str = "crop_yield_scaler.json";

/// Weights of the single-layer linear network
pub const DENSE_WEIGHTS: [f32; 9] = [0.001, 2.0, 1.5, 0.004, 1.0, -0.02, 0.05, 0.000_002, 0.000_001];
pub const DENSE_BIAS: f32 = 4.0;

/// Two depth-one trees: NDVI <= 0.4 -> 1.2 else 2.4; precipitation <= 10 -> 1.8 else 0.9
pub fn forest() -> ForestArtifact {
    let stump = |feature: i64, threshold: f64, low: f64, high: f64| TreeArrays {
        children_left: vec![1, -1, -1],
        children_right: vec![2, -1, -1],
        feature: vec![feature, -2, -2],
        threshold: vec![threshold, -2.0, -2.0],
        value: vec![(low + high) / 2.0, low, high],
    };
    ForestArtifact {
        n_features: 9,
        trees: vec![stump(1, 0.4, 1.2, 2.4), stump(6, 10.0, 1.8, 0.9)],
    }
}

pub fn dense() -> DenseArtifact {
    DenseArtifact {
        layers: vec![DenseLayerArtifact {
            kernel: DENSE_WEIGHTS.iter().map(|&w| vec![w]).collect(),
            bias: vec![DENSE_BIAS],
            activation: Activation::Linear,
        }],
    }
}

pub fn scaler() -> StandardScaler {
    StandardScaler {
        mean: vec![2015.0, 0.5, 0.5, 250.0, 0.5, 25.0, 10.0, 250_000.0, 500_000.0],
        scale: vec![8.0, 0.2, 0.2, 100.0, 0.2, 10.0, 4.0, 100_000.0, 200_000.0],
    }
}

pub fn write_json<T: Serialize>(dir: &Path, file: &str, value: &T) -> PathBuf {
    let path = dir.join(file);
    std::fs::write(&path, serde_json::to_vec(value).unwrap()).unwrap();
    path
}

/// Write the forest, dense network and scaler into `dir`.
pub fn write_artifacts(dir: &Path) {
    write_json(dir, FOREST_FILE, &forest());
    write_json(dir, DENSE_FILE, &dense());
    write_json(dir, SCALER_FILE, &scaler());
}

/// Models config rooted at `models_dir`. Downloadable artifacts point at
/// `local://<file>`; the ONNX model has no remote location.
pub fn models_config(models_dir: &Path) -> ModelsConfig {
    let local = |file: &str| ArtifactSource::new(file, Some(format!("local://{file}").as_str()));
    ModelsConfig {
        models_dir: models_dir.to_string_lossy().into_owned(),
        onnx_threads: 1,
        ensemble: local(FOREST_FILE),
        neural: ArtifactSource::new(ONNX_FILE, None),
        neural_fallback: local(DENSE_FILE),
        scaler: local(SCALER_FILE),
    }
}

/// Serves `local://<file>` URLs from a directory and counts calls.
pub struct LocalFetcher {
    source_dir: PathBuf,
    calls: AtomicUsize,
}

impl LocalFetcher {
    pub fn new(source_dir: &Path) -> Self {
        Self {
            source_dir: source_dir.to_path_buf(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ArtifactFetcher for LocalFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Let concurrent callers interleave
        tokio::time::sleep(Duration::from_millis(5)).await;

        let file = url.strip_prefix("local://").ok_or_else(|| LoadError::Download {
            url: url.to_string(),
            reason: "unsupported scheme".to_string(),
        })?;
        let bytes = tokio::fs::read(self.source_dir.join(file))
            .await
            .map_err(|e| LoadError::Download {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        write_atomically(dest, &bytes).await?;
        Ok(bytes.len() as u64)
    }
}

/// Every download fails, as with no network.
pub struct OfflineFetcher;

impl ArtifactFetcher for OfflineFetcher {
    async fn fetch(&self, url: &str, _dest: &Path) -> Result<u64, LoadError> {
        Err(LoadError::Download {
            url: url.to_string(),
            reason: "network unreachable".to_string(),
        })
    }
}
