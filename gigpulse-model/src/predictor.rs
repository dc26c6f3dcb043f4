//! Lazily loaded tree-ensemble predictor behind the core estimate seam.

use anyhow::Result;
use gigpulse_core::{EstimateProvider, Predictions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::error::ModelError;
use crate::meta::ModelMeta;
use crate::tree::TreeEnsemble;

pub const MODEL_BLOB_FILE: &str = "model_tree.json";
pub const MODEL_META_FILE: &str = "model_tree.meta.json";

/// Where the two model artifacts live.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPaths {
    pub blob: PathBuf,
    pub meta: PathBuf,
}

impl ModelPaths {
    pub fn new(blob: impl Into<PathBuf>, meta: impl Into<PathBuf>) -> Self {
        Self {
            blob: blob.into(),
            meta: meta.into(),
        }
    }

    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(MODEL_BLOB_FILE), dir.join(MODEL_META_FILE))
    }

    pub fn exist(&self) -> bool {
        self.blob.is_file() && self.meta.is_file()
    }
}

/// A loaded model: validated ensemble plus its metadata.
#[derive(Debug)]
pub struct ModelSession {
    meta: ModelMeta,
    ensemble: TreeEnsemble,
}

impl ModelSession {
    pub fn load(paths: &ModelPaths) -> Result<Self, ModelError> {
        for p in [&paths.blob, &paths.meta] {
            if !p.is_file() {
                return Err(ModelError::Missing(p.clone()));
            }
        }
        let meta = ModelMeta::load(&paths.meta)?;
        let ensemble = TreeEnsemble::load(&paths.blob)?;
        Self::from_parts(meta, ensemble)
    }

    pub fn from_parts(meta: ModelMeta, ensemble: TreeEnsemble) -> Result<Self, ModelError> {
        meta.validate()?;
        ensemble.validate(meta.feature_order.len())?;
        Ok(Self { meta, ensemble })
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn tree_count(&self) -> usize {
        self.ensemble.trees.len()
    }

    /// One prediction per metadata slug, keyed by slug.
    pub fn predict_for_all(&self, day_of_week: u32, hour: u32) -> Predictions {
        self.meta
            .area_slugs
            .iter()
            .enumerate()
            .map(|(area_id, slug)| {
                let x = self.meta.features(day_of_week, hour, area_id);
                (slug.clone(), self.ensemble.predict(&x))
            })
            .collect()
    }
}

/// Model handle. Artifacts are read on first inference and the session is
/// shared afterwards; a failed load is retried on the next call.
#[derive(Debug)]
pub struct TreePredictor {
    paths: ModelPaths,
    session: Mutex<Option<Arc<ModelSession>>>,
}

impl TreePredictor {
    pub fn new(paths: ModelPaths) -> Self {
        Self {
            paths,
            session: Mutex::new(None),
        }
    }

    pub fn paths(&self) -> &ModelPaths {
        &self.paths
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    /// Load-if-absent. Concurrent callers see the same session.
    pub fn session(&self) -> Result<Arc<ModelSession>, ModelError> {
        let mut guard = self.lock();
        if let Some(s) = guard.as_ref() {
            return Ok(Arc::clone(s));
        }
        let session = Arc::new(ModelSession::load(&self.paths)?);
        info!(
            blob = %self.paths.blob.display(),
            areas = session.meta().area_slugs.len(),
            trees = session.tree_count(),
            "model loaded"
        );
        *guard = Some(Arc::clone(&session));
        Ok(session)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<ModelSession>>> {
        // a panic while loading leaves None behind, which is still consistent
        self.session.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl EstimateProvider for TreePredictor {
    fn available(&self) -> bool {
        self.paths.exist()
    }

    fn predict_for_all(&self, day_of_week: u32, hour: u32) -> Result<Predictions> {
        Ok(self.session()?.predict_for_all(day_of_week, hour))
    }
}
