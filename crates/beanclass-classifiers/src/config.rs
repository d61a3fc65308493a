//! Configuration for model loading and prediction

use crate::predictor::ConfidenceMode;
use crate::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the classifier and predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Artifact path
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Confidence derivation
    #[serde(default)]
    pub confidence: ConfidenceMode,

    /// Memoized prediction entries (0 disables the cache)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            confidence: ConfidenceMode::default(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl ClassifierConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Convert to ModelConfig for loading
    pub fn to_model_config(&self) -> ModelConfig {
        ModelConfig::from_local(&self.model_path)
    }
}

pub fn default_model_path() -> PathBuf {
    PathBuf::from("models/bean_forest.json")
}

fn default_cache_capacity() -> usize {
    64
}
