//! Model loading from a local artifact file

use crate::classifier::Classifier;
use crate::forest::{ForestArtifact, RandomForest};
use beanclass_core::{ClassLabel, Error, FeatureMatrix, Probabilities, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Configuration for loading a model artifact
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Source of the model
    pub source: ModelSource,

    /// Artifact encoding
    pub format: ModelFormat,
}

/// Source location for the artifact
#[derive(Debug, Clone)]
pub enum ModelSource {
    /// Load from local file system
    LocalPath(PathBuf),
}

/// Model file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// JSON (recommended)
    Json,
    /// YAML
    Yaml,
}

impl ModelFormat {
    /// Guess the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

impl ModelConfig {
    /// Create a new model configuration from local path
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            format: ModelFormat::from_path(&path),
            source: ModelSource::LocalPath(path),
        }
    }

    /// Set model format
    pub fn with_format(mut self, format: ModelFormat) -> Self {
        self.format = format;
        self
    }
}

/// Descriptive information about a loaded model
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    /// Model version
    pub version: String,

    pub n_trees: usize,
    pub n_features: usize,
    pub n_classes: usize,

    /// Artifact path (for reference)
    pub path: PathBuf,
}

/// A loaded, validated, read-only model
#[derive(Debug)]
pub struct LoadedModel {
    forest: RandomForest,
    metadata: ModelMetadata,
}

impl LoadedModel {
    /// Load a model from configuration.
    ///
    /// Any failure here is fatal for serving: the file is absent, unreadable,
    /// not a forest artifact, or inconsistent with the bean schema.
    pub fn load(config: ModelConfig) -> Result<Self> {
        let path = Self::resolve_model_path(&config)?;

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::model_load(format!("Failed to read model file {:?}: {}", path, e))
        })?;

        let artifact: ForestArtifact = match config.format {
            ModelFormat::Json => serde_json::from_str(&content).map_err(|e| {
                Error::model_load(format!("Failed to deserialize JSON model: {}", e))
            })?,
            ModelFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| {
                Error::model_load(format!("Failed to deserialize YAML model: {}", e))
            })?,
        };

        let forest = RandomForest::from_artifact(artifact)?;
        let metadata = ModelMetadata {
            name: forest.name().to_string(),
            version: forest.version().unwrap_or("unversioned").to_string(),
            n_trees: forest.n_trees(),
            n_features: beanclass_core::FEATURE_COUNT,
            n_classes: beanclass_core::CLASS_COUNT,
            path,
        };

        info!(
            name = %metadata.name,
            version = %metadata.version,
            trees = metadata.n_trees,
            nodes = forest.n_nodes(),
            path = ?metadata.path,
            "Loaded model"
        );

        Ok(Self { forest, metadata })
    }

    /// Resolve model path from source
    fn resolve_model_path(config: &ModelConfig) -> Result<PathBuf> {
        match &config.source {
            ModelSource::LocalPath(path) => {
                if !path.exists() {
                    return Err(Error::model_load(format!(
                        "Model file not found: {:?}",
                        path
                    )));
                }
                Ok(path.clone())
            }
        }
    }

    /// Get model metadata
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl Classifier for LoadedModel {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<ClassLabel>> {
        self.forest.predict(features)
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Probabilities>> {
        self.forest.predict_proba(features)
    }

    fn name(&self) -> &str {
        &self.metadata.name
    }
}
