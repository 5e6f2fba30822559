//! Feature vector for crop yield model inference

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of features the models were trained on.
pub const FEATURE_COUNT: usize = 9;

/// One input field of the prediction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureField {
    Year,
    Ndvi,
    Evi,
    Gpp,
    SoilMoisture,
    LandSurfaceTemp,
    Precipitation,
    Area,
    Production,
}

/// Inclusive range accepted for a feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl FeatureField {
    /// All fields, in the column order used when the models were trained.
    pub const ALL: [FeatureField; FEATURE_COUNT] = [
        FeatureField::Year,
        FeatureField::Ndvi,
        FeatureField::Evi,
        FeatureField::Gpp,
        FeatureField::SoilMoisture,
        FeatureField::LandSurfaceTemp,
        FeatureField::Precipitation,
        FeatureField::Area,
        FeatureField::Production,
    ];

    /// Form label
    pub fn label(self) -> &'static str {
        match self {
            FeatureField::Year => "Year",
            FeatureField::Ndvi => "NDVI",
            FeatureField::Evi => "EVI",
            FeatureField::Gpp => "GPP",
            FeatureField::SoilMoisture => "Soil Moisture",
            FeatureField::LandSurfaceTemp => "Land Surface Temp (°C)",
            FeatureField::Precipitation => "Precipitation (mm)",
            FeatureField::Area => "Area (Hectares)",
            FeatureField::Production => "Production (Tonnes)",
        }
    }

    pub fn range(self) -> FieldRange {
        let (min, max) = match self {
            FeatureField::Year => (2000.0, 2030.0),
            FeatureField::Ndvi | FeatureField::Evi | FeatureField::SoilMoisture => (0.0, 1.0),
            FeatureField::Gpp => (0.0, 500.0),
            FeatureField::LandSurfaceTemp => (0.0, 50.0),
            FeatureField::Precipitation => (0.0, 20.0),
            FeatureField::Area => (0.0, 500_000.0),
            FeatureField::Production => (0.0, 1_000_000.0),
        };
        FieldRange { min, max }
    }

    /// Value prefilled in the form
    pub fn default_value(self) -> f64 {
        match self {
            FeatureField::Year => 2023.0,
            FeatureField::Ndvi => 0.5,
            FeatureField::Evi => 0.3,
            FeatureField::Gpp => 200.0,
            FeatureField::SoilMoisture => 0.3,
            FeatureField::LandSurfaceTemp => 30.0,
            FeatureField::Precipitation => 5.0,
            FeatureField::Area => 100_000.0,
            FeatureField::Production => 200_000.0,
        }
    }

    /// Whether the field only accepts whole numbers.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            FeatureField::Year | FeatureField::Area | FeatureField::Production
        )
    }

    /// Check a single value against this field's domain.
    pub fn validate(self, value: f64) -> Result<(), ValidationError> {
        let field = self.label();
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
        let range = self.range();
        if !range.contains(value) {
            return Err(ValidationError::OutOfRange {
                field,
                min: range.min,
                max: range.max,
                value,
            });
        }
        if self.is_integer() && value.fract() != 0.0 {
            return Err(ValidationError::NotWhole { field, value });
        }
        Ok(())
    }
}

impl fmt::Display for FeatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Agronomic and remote-sensing observations for one district-season.
///
/// Field order in [`FeatureVector::to_model_input`] is positional and must
/// match the column order of the training data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub year: f64,
    pub ndvi: f64,
    pub evi: f64,
    /// Gross primary productivity
    pub gpp: f64,
    pub soil_moisture: f64,
    /// Land surface temperature, °C
    pub lst: f64,
    /// Precipitation, mm
    pub precipitation: f64,
    /// Hectares
    pub area: f64,
    /// Tonnes
    pub production: f64,
}

impl FeatureVector {
    /// Read a field by name.
    pub fn get(&self, field: FeatureField) -> f64 {
        match field {
            FeatureField::Year => self.year,
            FeatureField::Ndvi => self.ndvi,
            FeatureField::Evi => self.evi,
            FeatureField::Gpp => self.gpp,
            FeatureField::SoilMoisture => self.soil_moisture,
            FeatureField::LandSurfaceTemp => self.lst,
            FeatureField::Precipitation => self.precipitation,
            FeatureField::Area => self.area,
            FeatureField::Production => self.production,
        }
    }

    /// Overwrite a field by name.
    pub fn set(&mut self, field: FeatureField, value: f64) {
        let slot = match field {
            FeatureField::Year => &mut self.year,
            FeatureField::Ndvi => &mut self.ndvi,
            FeatureField::Evi => &mut self.evi,
            FeatureField::Gpp => &mut self.gpp,
            FeatureField::SoilMoisture => &mut self.soil_moisture,
            FeatureField::LandSurfaceTemp => &mut self.lst,
            FeatureField::Precipitation => &mut self.precipitation,
            FeatureField::Area => &mut self.area,
            FeatureField::Production => &mut self.production,
        };
        *slot = value;
    }

    /// Validate every field, reporting the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        FeatureField::ALL
            .iter()
            .try_for_each(|&field| field.validate(self.get(field)))
    }

    /// Model input row, in training column order.
    pub fn to_model_input(&self) -> Vec<f32> {
        FeatureField::ALL
            .iter()
            .map(|&field| self.get(field) as f32)
            .collect()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        let mut features = Self {
            year: 0.0,
            ndvi: 0.0,
            evi: 0.0,
            gpp: 0.0,
            soil_moisture: 0.0,
            lst: 0.0,
            precipitation: 0.0,
            area: 0.0,
            production: 0.0,
        };
        for field in FeatureField::ALL {
            features.set(field, field.default_value());
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_form_defaults() {
        let features = FeatureVector::default();
        assert_eq!(features.year, 2023.0);
        assert_eq!(features.gpp, 200.0);
        assert_eq!(features.production, 200_000.0);
        assert!(features.validate().is_ok());
    }

    #[test]
    fn test_model_input_order() {
        let features = FeatureVector::default();
        let input = features.to_model_input();

        assert_eq!(input.len(), FEATURE_COUNT);
        assert_eq!(
            input,
            vec![2023.0, 0.5, 0.3, 200.0, 0.3, 30.0, 5.0, 100_000.0, 200_000.0]
        );
    }

    #[test]
    fn test_boundaries_accepted() {
        for field in FeatureField::ALL {
            let range = field.range();
            assert!(field.validate(range.min).is_ok(), "{field} min rejected");
            assert!(field.validate(range.max).is_ok(), "{field} max rejected");
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(
            FeatureField::Ndvi.validate(1.01),
            Err(ValidationError::OutOfRange {
                field: "NDVI",
                min: 0.0,
                max: 1.0,
                value: 1.01,
            })
        );
        assert!(FeatureField::Year.validate(1999.0).is_err());
        assert!(FeatureField::Precipitation.validate(-0.1).is_err());
    }

    #[test]
    fn test_integer_fields() {
        assert_eq!(
            FeatureField::Area.validate(10.5),
            Err(ValidationError::NotWhole {
                field: "Area (Hectares)",
                value: 10.5,
            })
        );
        assert!(FeatureField::Gpp.validate(10.5).is_ok());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut features = FeatureVector::default();
        features.set(FeatureField::Evi, f64::NAN);
        assert_eq!(
            features.validate(),
            Err(ValidationError::NonFinite { field: "EVI" })
        );
    }

    #[test]
    fn test_get_set_roundtrip_per_field() {
        let mut features = FeatureVector::default();
        for (i, field) in FeatureField::ALL.into_iter().enumerate() {
            features.set(field, i as f64);
            assert_eq!(features.get(field), i as f64);
            assert_eq!(features.to_model_input()[i], i as f32);
        }
    }
}
