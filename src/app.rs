//! Interactive terminal session: navigation menu, prediction form, static pages

use crate::dispatcher::PredictorDispatcher;
use crate::error::{AppError, PredictionError, Result};
use crate::metrics::SessionMetrics;
use crate::pages;
use crate::provisioner::{ArtifactFetcher, ModelProvisioner};
use crate::types::features::{FeatureField, FeatureVector};
use crate::types::prediction::{ModelKind, PredictionReport};
use inquire::validator::Validation;
use inquire::{CustomType, CustomUserError, InquireError, Select};
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{error, info};

/// Navigation entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Project,
    Predictor,
    Team,
    Exit,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Project, Page::Predictor, Page::Team, Page::Exit];
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Page::Project => "Our Project",
            Page::Predictor => "Predictor",
            Page::Team => "Our Team",
            Page::Exit => "Exit",
        })
    }
}

/// Run one prediction and record it.
///
/// Failures are logged and returned for display; they never end the session.
pub fn submit(
    dispatcher: &PredictorDispatcher,
    metrics: &mut SessionMetrics,
    features: &FeatureVector,
    kind: ModelKind,
) -> std::result::Result<PredictionReport, PredictionError> {
    let start = Instant::now();
    match dispatcher.predict(features, kind) {
        Ok(value) => {
            metrics.record_prediction(kind, start.elapsed(), value);
            let report = PredictionReport::new(kind, value, *features);
            info!(
                model = %kind,
                predicted_yield = value,
                at = %report.timestamp.to_rfc3339(),
                "Prediction served"
            );
            Ok(report)
        }
        Err(e) => {
            metrics.record_failure(kind);
            error!(model = %kind, error = %e, "Prediction error");
            Err(e)
        }
    }
}

/// Interactive session over a provisioner. Models are loaded on the first
/// form submission; a load failure ends the session.
pub struct App<'a, F: ArtifactFetcher> {
    runtime: &'a Runtime,
    provisioner: &'a ModelProvisioner<F>,
    asset_dir: PathBuf,
    metrics: SessionMetrics,
}

impl<'a, F: ArtifactFetcher> App<'a, F> {
    pub fn new(runtime: &'a Runtime, provisioner: &'a ModelProvisioner<F>, asset_dir: PathBuf) -> Self {
        Self {
            runtime,
            provisioner,
            asset_dir,
            metrics: SessionMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Menu loop until the user exits or cancels
    pub fn run(&mut self) -> Result<()> {
        loop {
            let page = match Select::new("Explore", Page::ALL.to_vec()).prompt() {
                Ok(page) => page,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            match page {
                Page::Project => println!("\n{}\n", pages::render_project(&self.asset_dir)),
                Page::Team => println!("\n{}\n", pages::render_team()),
                Page::Predictor => self.predictor_page()?,
                Page::Exit => return Ok(()),
            }
        }
    }

    fn predictor_page(&mut self) -> Result<()> {
        println!("\nCrop Yield Prediction\n");

        let form = Select::new("Select Model", ModelKind::ALL.to_vec())
            .prompt()
            .and_then(|kind| prompt_features().map(|features| (kind, features)));
        let (kind, features) = match form {
            Ok(submission) => submission,
            // Esc leaves the form and returns to the menu
            Err(InquireError::OperationCanceled) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = features.validate() {
            println!("Invalid input: {e}\n");
            return Ok(());
        }

        let bundle = self
            .runtime
            .block_on(self.provisioner.acquire())
            .map_err(AppError::Load)?;
        let dispatcher = PredictorDispatcher::new(bundle);

        match submit(&dispatcher, &mut self.metrics, &features, kind) {
            Ok(report) => println!("\n{report}\n"),
            Err(e) => println!("\nPrediction error: {e}\n"),
        }
        Ok(())
    }
}

fn range_validator(
    field: FeatureField,
) -> impl Fn(&f64) -> std::result::Result<Validation, CustomUserError> + Clone {
    move |value: &f64| match field.validate(*value) {
        Ok(()) => Ok(Validation::Valid),
        Err(e) => Ok(Validation::Invalid(e.to_string().into())),
    }
}

fn prompt_field(field: FeatureField) -> std::result::Result<f64, InquireError> {
    let range = field.range();
    let help = format!("{} to {}", range.min, range.max);

    if field.is_integer() {
        let validate = range_validator(field);
        CustomType::<u32>::new(field.label())
            .with_default(field.default_value() as u32)
            .with_help_message(&help)
            .with_error_message("Please type a whole number")
            .with_validator(move |value: &u32| validate(&f64::from(*value)))
            .prompt()
            .map(f64::from)
    } else {
        CustomType::<f64>::new(field.label())
            .with_default(field.default_value())
            .with_help_message(&help)
            .with_error_message("Please type a number")
            .with_validator(range_validator(field))
            .prompt()
    }
}

/// Ask for every feature in training order.
fn prompt_features() -> std::result::Result<FeatureVector, InquireError> {
    let mut features = FeatureVector::default();
    for field in FeatureField::ALL {
        features.set(field, prompt_field(field)?);
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bundle::ModelBundle;
    use crate::models::scaler::StandardScaler;
    use crate::models::Regressor;
    use std::sync::Arc;

    struct Constant(f64);

    impl Regressor for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn n_features(&self) -> Option<usize> {
            None
        }

        fn predict(&self, _features: &[f32]) -> std::result::Result<f64, PredictionError> {
            Ok(self.0)
        }
    }

    fn dispatcher(scaler_width: usize) -> PredictorDispatcher {
        PredictorDispatcher::new(Arc::new(ModelBundle::new(
            Box::new(Constant(2.0)),
            Box::new(Constant(3.0)),
            StandardScaler {
                mean: vec![0.0; scaler_width],
                scale: vec![1.0; scaler_width],
            },
        )))
    }

    #[test]
    fn test_page_labels() {
        let labels: Vec<String> = Page::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["Our Project", "Predictor", "Our Team", "Exit"]);
    }

    #[test]
    fn test_submit_records_success() {
        let mut metrics = SessionMetrics::new();
        let report = submit(
            &dispatcher(9),
            &mut metrics,
            &FeatureVector::default(),
            ModelKind::Neural,
        )
        .unwrap();

        assert_eq!(report.yield_per_hectare, 3.0);
        assert_eq!(report.model, ModelKind::Neural);
        assert_eq!(metrics.predictions(ModelKind::Neural), 1);
    }

    #[test]
    fn test_submit_records_failure() {
        let mut metrics = SessionMetrics::new();
        let result = submit(
            &dispatcher(4),
            &mut metrics,
            &FeatureVector::default(),
            ModelKind::Neural,
        );

        assert!(result.is_err());
        assert_eq!(metrics.failures(ModelKind::Neural), 1);
        assert_eq!(metrics.predictions(ModelKind::Neural), 0);
    }

    #[test]
    fn test_range_validator() {
        let validate = range_validator(FeatureField::Ndvi);
        assert!(matches!(validate(&1.0), Ok(Validation::Valid)));
        assert!(matches!(validate(&1.5), Ok(Validation::Invalid(_))));
    }
}
