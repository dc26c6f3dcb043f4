//! gigpulse-model: trained tree-ensemble earnings model behind the core estimate seam

pub mod error;
pub mod meta;
pub mod predictor;
pub mod tree;

pub use error::ModelError;
pub use meta::ModelMeta;
pub use predictor::{ModelPaths, ModelSession, TreePredictor, MODEL_BLOB_FILE, MODEL_META_FILE};
pub use tree::{Node, Tree, TreeEnsemble};
