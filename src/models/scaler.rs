//! Feature standardization applied before neural inference

use crate::error::PredictionError;
use serde::{Deserialize, Serialize};

/// Fitted standardization: `(x - mean) / scale` per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Structural checks done at load time. Arity against the feature
    /// vector is only known when transforming.
    pub fn validate(&self) -> Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} columns, scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.mean.is_empty() {
            return Err("scaler has no columns".to_string());
        }
        if let Some(i) = self
            .mean
            .iter()
            .chain(&self.scale)
            .position(|v| !v.is_finite())
        {
            return Err(format!("non-finite parameter at position {i}"));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one row. Zero-variance columns are centered only.
    pub fn transform(&self, features: &[f32]) -> Result<Vec<f32>, PredictionError> {
        if features.len() != self.mean.len() || self.scale.len() != self.mean.len() {
            return Err(PredictionError::Scaling(format!(
                "scaler was fitted on {} features, got {}",
                self.mean.len(),
                features.len()
            )));
        }

        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&x, (&mean, &scale))| {
                let scale = if scale == 0.0 { 1.0 } else { scale };
                ((f64::from(x) - mean) / scale) as f32
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform() {
        let scaler = StandardScaler {
            mean: vec![10.0, 0.5, 3.0],
            scale: vec![2.0, 0.25, 0.0],
        };
        assert!(scaler.validate().is_ok());

        let scaled = scaler.transform(&[14.0, 0.0, 5.0]).unwrap();
        assert_eq!(scaled, vec![2.0, -2.0, 2.0]);
    }

    #[test]
    fn test_transform_wrong_arity() {
        let scaler = StandardScaler {
            mean: vec![0.0; 8],
            scale: vec![1.0; 8],
        };
        let err = scaler.transform(&[0.0; 9]).unwrap_err();
        assert!(matches!(err, PredictionError::Scaling(_)));
        assert!(err.to_string().contains("fitted on 8 features, got 9"));
    }

    #[test]
    fn test_validate_rejects_mismatched_lengths() {
        let scaler = StandardScaler {
            mean: vec![0.0; 9],
            scale: vec![1.0; 8],
        };
        assert!(scaler.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let scaler = StandardScaler {
            mean: vec![0.0, f64::INFINITY],
            scale: vec![1.0, 1.0],
        };
        assert!(scaler.validate().unwrap_err().contains("position 1"));
    }

    #[test]
    fn test_deserialize() {
        let scaler: StandardScaler =
            serde_json::from_str(r#"{"mean": [1.0, 2.0], "scale": [0.5, 4.0]}"#).unwrap();
        assert_eq!(scaler.n_features(), 2);
    }
}
