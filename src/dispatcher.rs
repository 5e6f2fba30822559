//! Routes a feature vector to the selected regressor

use crate::error::PredictionError;
use crate::models::bundle::ModelBundle;
use crate::types::features::FeatureVector;
use crate::types::prediction::ModelKind;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Stateless dispatch over a loaded, immutable bundle.
#[derive(Debug, Clone)]
pub struct PredictorDispatcher {
    bundle: Arc<ModelBundle>,
}

impl PredictorDispatcher {
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        Self { bundle }
    }

    pub fn bundle(&self) -> &Arc<ModelBundle> {
        &self.bundle
    }

    /// Predict yield (tonnes per hectare).
    ///
    /// The ensemble sees raw features; the neural model sees the
    /// scaler's transform of them.
    pub fn predict(
        &self,
        features: &FeatureVector,
        kind: ModelKind,
    ) -> Result<f64, PredictionError> {
        let start = Instant::now();
        let input = features.to_model_input();

        let (model, value) = match kind {
            ModelKind::Ensemble => {
                let model = self.bundle.ensemble();
                (model.name(), model.predict(&input)?)
            }
            ModelKind::Neural => {
                let scaled = self.bundle.scaler().transform(&input)?;
                let model = self.bundle.neural();
                (model.name(), model.predict(&scaled)?)
            }
        };

        if !value.is_finite() {
            return Err(PredictionError::NonFinite {
                model: model.to_string(),
                value,
            });
        }

        debug!(
            model = %model,
            kind = ?kind,
            value = value,
            latency_us = start.elapsed().as_micros(),
            "Prediction complete"
        );

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scaler::StandardScaler;
    use crate::models::Regressor;
    use crate::types::features::FEATURE_COUNT;

    /// Returns a fixed linear combination of its input
    struct Weighted(Vec<f64>);

    impl Regressor for Weighted {
        fn name(&self) -> &str {
            "weighted"
        }

        fn n_features(&self) -> Option<usize> {
            Some(self.0.len())
        }

        fn predict(&self, features: &[f32]) -> Result<f64, PredictionError> {
            Ok(features
                .iter()
                .zip(&self.0)
                .map(|(&x, w)| f64::from(x) * w)
                .sum())
        }
    }

    fn dispatcher(scaler: StandardScaler) -> PredictorDispatcher {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[1] = 10.0; // ndvi
        PredictorDispatcher::new(Arc::new(ModelBundle::new(
            Box::new(Weighted(weights.clone())),
            Box::new(Weighted(weights)),
            scaler,
        )))
    }

    fn identity_scaler() -> StandardScaler {
        StandardScaler {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        }
    }

    #[test]
    fn test_ensemble_uses_raw_features() {
        let mut scaler = identity_scaler();
        scaler.mean[1] = 0.5;
        let dispatcher = dispatcher(scaler);

        let value = dispatcher
            .predict(&FeatureVector::default(), ModelKind::Ensemble)
            .unwrap();
        assert_eq!(value, 5.0);
    }

    #[test]
    fn test_neural_uses_scaled_features() {
        let mut scaler = identity_scaler();
        scaler.mean[1] = 0.25;
        scaler.scale[1] = 0.5;
        let dispatcher = dispatcher(scaler);

        // (0.5 - 0.25) / 0.5 * 10
        let value = dispatcher
            .predict(&FeatureVector::default(), ModelKind::Neural)
            .unwrap();
        assert_eq!(value, 5.0);
    }

    #[test]
    fn test_scaler_failure_is_reported() {
        let dispatcher = dispatcher(StandardScaler {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        });

        let result = dispatcher.predict(&FeatureVector::default(), ModelKind::Neural);
        assert!(matches!(result, Err(PredictionError::Scaling(_))));

        // the ensemble path does not touch the scaler
        assert!(dispatcher
            .predict(&FeatureVector::default(), ModelKind::Ensemble)
            .is_ok());
    }

    #[test]
    fn test_non_finite_output_rejected() {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[0] = f64::INFINITY;
        let dispatcher = PredictorDispatcher::new(Arc::new(ModelBundle::new(
            Box::new(Weighted(weights.clone())),
            Box::new(Weighted(weights)),
            identity_scaler(),
        )));

        let result = dispatcher.predict(&FeatureVector::default(), ModelKind::Ensemble);
        assert!(matches!(result, Err(PredictionError::NonFinite { .. })));
    }
}
