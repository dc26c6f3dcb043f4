//! Area registry: the static catalog of delivery areas and distance lookups.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A named geographic zone with a centroid coordinate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Area {
    /// Unique identifier (e.g. "shibuya")
    pub slug: String,
    /// Display name
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Area {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            lat,
            lng,
        }
    }
}

/// Read-only area catalog. Iteration follows catalog order.
#[derive(Debug, Clone, Default)]
pub struct AreaRegistry {
    areas: Vec<Area>,
    index: HashMap<String, usize>,
}

impl AreaRegistry {
    /// Build a registry, rejecting duplicate slugs.
    pub fn new(areas: Vec<Area>) -> Result<Self> {
        let mut index = HashMap::with_capacity(areas.len());
        for (i, a) in areas.iter().enumerate() {
            if a.slug.trim().is_empty() {
                bail!("area #{i} has an empty slug");
            }
            if index.insert(a.slug.clone(), i).is_some() {
                bail!("duplicate area slug: {}", a.slug);
            }
        }
        Ok(Self { areas, index })
    }

    /// The built-in central Tokyo catalog.
    pub fn builtin() -> Self {
        let areas = vec![
            Area::new("shibuya", "渋谷駅周辺", 35.6595, 139.7005),
            Area::new("ebisu", "恵比寿駅周辺", 35.6467, 139.7101),
            Area::new("shinjuku", "新宿駅周辺", 35.6900, 139.7000),
            Area::new("ikebukuro", "池袋駅周辺", 35.7295, 139.7100),
            Area::new("ueno", "上野駅周辺", 35.7138, 139.7773),
            Area::new("asakusa", "浅草・吾妻橋", 35.7119, 139.7967),
            Area::new("kanda", "神田・秋葉原", 35.6917, 139.7708),
            Area::new("ginza", "銀座・有楽町", 35.6717, 139.7650),
        ];
        let index = areas
            .iter()
            .enumerate()
            .map(|(i, a)| (a.slug.clone(), i))
            .collect();
        Self { areas, index }
    }

    /// Load a catalog from a JSON array of areas.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let areas: Vec<Area> =
            serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
        Self::new(areas).with_context(|| format!("invalid area catalog {}", path.display()))
    }

    pub fn get(&self, slug: &str) -> Option<&Area> {
        self.index.get(slug).map(|&i| &self.areas[i])
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.index.contains_key(slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Area> {
        self.areas.iter()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Great-circle distance between two areas.
    ///
    /// Unknown slugs yield 0.0: callers only use distance as a soft penalty.
    pub fn distance_km(&self, a: &str, b: &str) -> f64 {
        match (self.get(a), self.get(b)) {
            (Some(x), Some(y)) => haversine_km(x.lat, x.lng, y.lat, y.lng),
            _ => 0.0,
        }
    }
}

/// Haversine distance in kilometres between two lat/lng points (degrees).
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = (lat2 - lat1).to_radians();
    let dl = (lng2 - lng1).to_radians();
    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}
