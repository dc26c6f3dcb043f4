//! Blend empirical hourly stats with model predictions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::area::AreaRegistry;
use crate::estimate::{Estimate, Predictions};
use crate::stats::{round_whole, HourlyStat, HourlySurface};

pub const ALPHA_MIN: f64 = 0.2;
pub const ALPHA_MAX: f64 = 0.85;
/// Evidence hours at which history and model get equal raw weight.
const ALPHA_HALF_HOURS: f64 = 2.0;

/// Which estimate source(s) a query uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// History only
    Base,
    /// Model only
    Ml,
    #[default]
    Blend,
}

impl FromStr for BlendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base" => Ok(BlendMode::Base),
            "ml" => Ok(BlendMode::Ml),
            "blend" => Ok(BlendMode::Blend),
            other => Err(format!("unknown mode '{other}' (expected base, ml or blend)")),
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlendMode::Base => "base",
            BlendMode::Ml => "ml",
            BlendMode::Blend => "blend",
        })
    }
}

/// Weight given to history, from the volume of evidence behind it.
pub fn empirical_weight(samples_h: f64) -> f64 {
    let samples_h = samples_h.max(0.0);
    (samples_h / (samples_h + ALPHA_HALF_HOURS)).clamp(ALPHA_MIN, ALPHA_MAX)
}

/// Weighted mix of `base` and `ml` for every registry area.
pub fn blend(areas: &AreaRegistry, base: &HourlySurface, ml: &Predictions) -> HourlySurface {
    areas
        .iter()
        .map(|a| {
            let b = base.get(&a.slug).copied().unwrap_or_default();
            let m = ml.get(&a.slug).copied().unwrap_or(0.0);
            let alpha = empirical_weight(b.samples_h);
            let hourly = round_whole(alpha * b.hourly + (1.0 - alpha) * m);
            (a.slug.clone(), HourlyStat::new(hourly, b.samples_h))
        })
        .collect()
}

/// Model predictions alone; evidence volume is reported as zero.
pub fn model_only(areas: &AreaRegistry, ml: &Predictions) -> HourlySurface {
    areas
        .iter()
        .map(|a| {
            let m = ml.get(&a.slug).copied().unwrap_or(0.0);
            (a.slug.clone(), HourlyStat::new(round_whole(m), 0.0))
        })
        .collect()
}

/// Apply `mode`, falling back to `base` when the model is unavailable.
pub fn apply_mode(
    mode: BlendMode,
    areas: &AreaRegistry,
    base: HourlySurface,
    estimate: Estimate,
) -> HourlySurface {
    match (mode, estimate) {
        (BlendMode::Base, _) => base,
        (BlendMode::Ml, Estimate::Available(ml)) => model_only(areas, &ml),
        (BlendMode::Blend, Estimate::Available(ml)) => blend(areas, &base, &ml),
        (_, Estimate::Unavailable) => {
            debug!(%mode, "model unavailable; serving base statistics");
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;
    use std::collections::HashMap;

    fn areas() -> AreaRegistry {
        AreaRegistry::new(vec![
            Area::new("a", "A", 35.0, 139.0),
            Area::new("b", "B", 35.0, 139.1),
            Area::new("c", "C", 35.0, 139.2),
        ])
        .unwrap()
    }

    #[test]
    fn test_alpha_bounds() {
        assert_eq!(empirical_weight(0.0), ALPHA_MIN);
        assert_eq!(empirical_weight(0.3), ALPHA_MIN);
        assert!((empirical_weight(2.0) - 0.5).abs() < 1e-12);
        let mut prev = 0.0;
        for s in [0.0, 0.1, 1.0, 3.0, 8.0, 11.0, 1e3, 1e6] {
            let a = empirical_weight(s);
            assert!((ALPHA_MIN..=ALPHA_MAX).contains(&a), "samples={s}");
            assert!(a >= prev);
            prev = a;
        }
        // raw ratio only reaches 0.85 above 11.33h; the clamp caps it there
        assert!(empirical_weight(11.0) < ALPHA_MAX);
        assert_eq!(empirical_weight(1e6), ALPHA_MAX);
    }

    #[test]
    fn test_blend_weights_by_evidence() {
        let base: HourlySurface = [
            ("a", HourlyStat::new(2000.0, 0.0)),
            ("b", HourlyStat::new(2000.0, 2.0)),
        ]
        .into_iter()
        .collect();
        let ml = HashMap::from([("a".to_string(), 1000.0), ("b".to_string(), 1000.0)]);

        let out = blend(&areas(), &base, &ml);
        // alpha 0.2
        assert_eq!(out.get("a"), Some(&HourlyStat::new(1200.0, 0.0)));
        // alpha 0.5
        assert_eq!(out.get("b"), Some(&HourlyStat::new(1500.0, 2.0)));
        // missing everywhere
        assert_eq!(out.get("c"), Some(&HourlyStat::new(0.0, 0.0)));
    }

    #[test]
    fn test_blend_ignores_unknown_model_areas() {
        let base = HourlySurface::new();
        let ml = HashMap::from([("zzz".to_string(), 9000.0)]);
        let out = blend(&areas(), &base, &ml);
        assert_eq!(out.len(), 3);
        assert!(out.get("zzz").is_none());
    }

    #[test]
    fn test_mode_dispatch_and_degradation() {
        let base: HourlySurface = [("a", HourlyStat::new(1800.0, 4.0))].into_iter().collect();
        let ml = HashMap::from([("a".to_string(), 2400.4)]);

        let got = apply_mode(BlendMode::Base, &areas(), base.clone(), Estimate::Available(ml.clone()));
        assert_eq!(got, base);

        let got = apply_mode(BlendMode::Ml, &areas(), base.clone(), Estimate::Available(ml.clone()));
        assert_eq!(got.get("a"), Some(&HourlyStat::new(2400.0, 0.0)));

        for mode in [BlendMode::Ml, BlendMode::Blend] {
            let got = apply_mode(mode, &areas(), base.clone(), Estimate::Unavailable);
            assert_eq!(got, base);
        }
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("BLEND".parse::<BlendMode>().unwrap(), BlendMode::Blend);
        assert_eq!("ml".parse::<BlendMode>().unwrap(), BlendMode::Ml);
        assert!("both".parse::<BlendMode>().is_err());
        assert_eq!(BlendMode::default().to_string(), "blend");
    }
}
