//! Model metadata document: the area vocabulary and feature layout the model
//! was trained with.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ModelError;

/// Feature names understood by the predictor.
pub const FEATURE_DOW: &str = "dow";
pub const FEATURE_HOUR: &str = "hour";
pub const FEATURE_AREA: &str = "area_id";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Area slugs; a slug's position is its `area_id` feature value
    pub area_slugs: Vec<String>,
    #[serde(default = "default_feature_order")]
    pub feature_order: Vec<String>,
    #[serde(default)]
    pub trained_at: Option<String>,
    #[serde(default)]
    pub lookback_days: Option<u32>,
    /// Validation mean absolute error (currency per hour)
    #[serde(default)]
    pub mae_val: Option<f64>,
}

fn default_feature_order() -> Vec<String> {
    vec![
        FEATURE_DOW.to_string(),
        FEATURE_HOUR.to_string(),
        FEATURE_AREA.to_string(),
    ]
}

impl ModelMeta {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let s = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let meta: ModelMeta = serde_json::from_str(&s).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        meta.validate()?;
        Ok(meta)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.area_slugs.is_empty() {
            return Err(ModelError::Invalid("metadata lists no area slugs".into()));
        }
        for f in &self.feature_order {
            if ![FEATURE_DOW, FEATURE_HOUR, FEATURE_AREA].contains(&f.as_str()) {
                return Err(ModelError::Invalid(format!("unknown feature '{f}'")));
            }
        }
        Ok(())
    }

    /// Feature vector for one area in `feature_order`.
    pub fn features(&self, day_of_week: u32, hour: u32, area_id: usize) -> Vec<f32> {
        self.feature_order
            .iter()
            .map(|f| match f.as_str() {
                FEATURE_DOW => day_of_week as f32,
                FEATURE_HOUR => hour as f32,
                _ => area_id as f32,
            })
            .collect()
    }
}
