//! The immutable (ensemble, neural, scaler) triple served to the dispatcher

use crate::models::scaler::StandardScaler;
use crate::models::Regressor;
use std::fmt;

/// Loaded models, shared read-only for the lifetime of the session.
pub struct ModelBundle {
    ensemble: Box<dyn Regressor>,
    neural: Box<dyn Regressor>,
    scaler: StandardScaler,
}

impl ModelBundle {
    pub fn new(
        ensemble: Box<dyn Regressor>,
        neural: Box<dyn Regressor>,
        scaler: StandardScaler,
    ) -> Self {
        Self {
            ensemble,
            neural,
            scaler,
        }
    }

    pub fn ensemble(&self) -> &dyn Regressor {
        self.ensemble.as_ref()
    }

    pub fn neural(&self) -> &dyn Regressor {
        self.neural.as_ref()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("ensemble", &self.ensemble.name())
            .field("neural", &self.neural.name())
            .field("scaler_features", &self.scaler.n_features())
            .finish()
    }
}
