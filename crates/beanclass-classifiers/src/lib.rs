//! beanclass Classifiers
//!
//! Dry-bean classification over a pre-trained random forest artifact.
//!
//! - [`Classifier`] is the seam between the predictor and any model backend
//! - [`LoadedModel`] reads and validates the artifact once at startup
//! - [`predict`] runs one batched inference call and derives confidences
//! - [`MemoizedPredictor`] remembers recent answers keyed on input content
//!
//! Inference is CPU-only and synchronous; a prediction over a few thousand
//! rows completes in well under a millisecond per row.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod forest;
pub mod model_loader;
pub mod predictor;

pub use cache::{MemoizedPredictor, PredictionOutcome};
pub use classifier::Classifier;
pub use config::ClassifierConfig;
pub use forest::{DecisionTree, ForestArtifact, RandomForest, TreeArtifact};
pub use model_loader::{LoadedModel, ModelConfig, ModelFormat, ModelMetadata, ModelSource};
pub use predictor::{predict, ConfidenceMode, PredictionBatch};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cache::{MemoizedPredictor, PredictionOutcome};
    pub use crate::classifier::Classifier;
    pub use crate::model_loader::{LoadedModel, ModelConfig};
    pub use crate::predictor::{predict, ConfidenceMode, PredictionBatch};
}
