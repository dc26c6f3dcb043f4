//! Model estimate provider seam.
//!
//! A trained regression model is optional. Callers never talk to a provider
//! directly; they go through [`probe`], which turns "no model" and inference
//! failures alike into [`Estimate::Unavailable`].

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Predicted hourly rate per area slug.
pub type Predictions = HashMap<String, f64>;

/// A trained model's inference contract.
pub trait EstimateProvider: Send + Sync {
    /// True only when the model and its metadata can be loaded.
    fn available(&self) -> bool;

    /// Raw predicted hourly rate for every area the model was trained on.
    fn predict_for_all(&self, day_of_week: u32, hour: u32) -> Result<Predictions>;
}

/// Outcome of asking for a model estimate.
#[derive(Debug, Clone, PartialEq)]
pub enum Estimate {
    Available(Predictions),
    Unavailable,
}

/// Check availability, then infer. Never fails.
pub fn probe(provider: Option<&dyn EstimateProvider>, day_of_week: u32, hour: u32) -> Estimate {
    let Some(p) = provider else {
        return Estimate::Unavailable;
    };
    if !p.available() {
        debug!("model artifacts not available");
        return Estimate::Unavailable;
    }
    match p.predict_for_all(day_of_week, hour) {
        Ok(preds) => Estimate::Available(preds),
        Err(e) => {
            warn!(error = %e, day_of_week, hour, "model inference failed; using history only");
            Estimate::Unavailable
        }
    }
}

/// Fixed predictions, handy for wiring and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEstimates {
    by_slot: HashMap<(u32, u32), Predictions>,
    fallback: Predictions,
}

impl StaticEstimates {
    /// Same predictions for every slot.
    pub fn constant(preds: Predictions) -> Self {
        Self {
            by_slot: HashMap::new(),
            fallback: preds,
        }
    }

    pub fn with_slot(mut self, day_of_week: u32, hour: u32, preds: Predictions) -> Self {
        self.by_slot.insert((day_of_week, hour), preds);
        self
    }
}

impl EstimateProvider for StaticEstimates {
    fn available(&self) -> bool {
        true
    }

    fn predict_for_all(&self, day_of_week: u32, hour: u32) -> Result<Predictions> {
        Ok(self
            .by_slot
            .get(&(day_of_week, hour))
            .unwrap_or(&self.fallback)
            .clone())
    }
}
