//! Demo Artifact Generator
//!
//! Writes a randomly initialised forest, dense network and scaler in the
//! formats the predictor loads, so the app can run without remote storage.
//!
//! Usage: generate-demo-artifacts [output_dir] [seed] [trees]

use anyhow::Context;
use crop_yield_predictor::dispatcher::PredictorDispatcher;
use crop_yield_predictor::models::forest::{ForestArtifact, TreeArrays};
use crop_yield_predictor::models::loader::{ArtifactPaths, ModelLoader};
use crop_yield_predictor::models::neural::{Activation, DenseArtifact, DenseLayerArtifact};
use crop_yield_predictor::models::scaler::StandardScaler;
use crop_yield_predictor::types::{FeatureField, FeatureVector, ModelKind, FEATURE_COUNT};
use crop_yield_predictor::AppConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const TREE_DEPTH: usize = 4;
const HIDDEN_UNITS: [usize; 2] = [16, 8];

/// Random artifact generator
struct ArtifactGenerator {
    rng: StdRng,
}

impl ArtifactGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Full tree of the given depth, nodes stored in pre-order
    fn generate_tree(&mut self, depth: usize) -> TreeArrays {
        let mut arrays = TreeArrays {
            children_left: Vec::new(),
            children_right: Vec::new(),
            feature: Vec::new(),
            threshold: Vec::new(),
            value: Vec::new(),
        };
        self.grow(&mut arrays, depth);
        arrays
    }

    fn grow(&mut self, arrays: &mut TreeArrays, depth: usize) -> i64 {
        let node = arrays.children_left.len();
        arrays.children_left.push(-1);
        arrays.children_right.push(-1);
        arrays.feature.push(-2);
        arrays.threshold.push(-2.0);
        // Yield in tonnes per hectare
        arrays.value.push(self.rng.gen_range(0.5..4.0));

        if depth > 0 {
            let index = self.rng.gen_range(0..FEATURE_COUNT);
            let range = FeatureField::ALL[index].range();
            let threshold = self.rng.gen_range(range.min..range.max);

            let left = self.grow(arrays, depth - 1);
            let right = self.grow(arrays, depth - 1);

            arrays.children_left[node] = left;
            arrays.children_right[node] = right;
            arrays.feature[node] = index as i64;
            arrays.threshold[node] = threshold;
        }
        node as i64
    }

    fn generate_forest(&mut self, trees: usize) -> ForestArtifact {
        ForestArtifact {
            n_features: FEATURE_COUNT,
            trees: (0..trees).map(|_| self.generate_tree(TREE_DEPTH)).collect(),
        }
    }

    fn generate_dense(&mut self) -> DenseArtifact {
        let mut layers = Vec::new();
        let mut inputs = FEATURE_COUNT;
        for units in HIDDEN_UNITS {
            layers.push(self.dense_layer(inputs, units, Activation::Relu, 0.0));
            inputs = units;
        }
        layers.push(self.dense_layer(inputs, 1, Activation::Linear, 2.0));
        DenseArtifact { layers }
    }

    fn dense_layer(
        &mut self,
        inputs: usize,
        units: usize,
        activation: Activation,
        bias: f32,
    ) -> DenseLayerArtifact {
        let limit = (6.0 / (inputs + units) as f32).sqrt();
        DenseLayerArtifact {
            kernel: (0..inputs)
                .map(|_| (0..units).map(|_| self.rng.gen_range(-limit..limit)).collect())
                .collect(),
            bias: vec![bias; units],
            activation,
        }
    }
}

/// Center on the middle of each field's range, a quarter range per unit.
fn demo_scaler() -> StandardScaler {
    let (mean, scale) = FeatureField::ALL
        .iter()
        .map(|field| {
            let range = field.range();
            ((range.min + range.max) / 2.0, (range.max - range.min) / 4.0)
        })
        .unzip();
    StandardScaler { mean, scale }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Artifact written");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_demo_artifacts=info".parse()?)
                .add_directive("crop_yield_predictor=info".parse()?),
        )
        .init();

    info!("Starting Demo Artifact Generator");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let defaults = AppConfig::default();
    let output_dir = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| defaults.models.models_dir.clone());
    let seed: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(42);
    let trees: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(20);

    info!(output_dir = %output_dir, seed = seed, trees = trees, "Configuration loaded");

    let mut models = defaults.models;
    models.models_dir = output_dir;
    let paths = ArtifactPaths::from_config(&models);
    std::fs::create_dir_all(&models.models_dir)
        .with_context(|| format!("Failed to create {}", models.models_dir))?;

    let mut generator = ArtifactGenerator::new(seed);
    write_json(&paths.ensemble, &generator.generate_forest(trees))?;
    write_json(&paths.neural_fallback, &generator.generate_dense())?;
    write_json(&paths.scaler, &demo_scaler())?;

    // Load back through the regular path as a check
    let bundle = ModelLoader::new().load_bundle(&paths)?;
    let dispatcher = PredictorDispatcher::new(Arc::new(bundle));
    let features = FeatureVector::default();
    for kind in ModelKind::ALL {
        let value = dispatcher.predict(&features, kind)?;
        info!(model = %kind, predicted_yield = value, "Sample prediction on form defaults");
    }

    info!("Completed! Artifacts ready in {}", models.models_dir);
    Ok(())
}
