//! beanclass Core
//!
//! Core types, traits, and utilities shared across beanclass components.
//!
//! This crate provides:
//! - The 16-feature input schema with form defaults
//! - Feature vectors/matrices, class labels, and prediction results
//! - Error types and result handling
//! - Validation of single-record form submissions
//! - Batch CSV parsing and prediction CSV export

pub mod batch;
pub mod error;
pub mod report;
pub mod types;
pub mod validation;

pub use error::{Error, Result, SourceError, ValidationError};
pub use types::{
    ClassLabel, FeatureMatrix, FeatureVector, FieldSpec, MatrixFingerprint, PredictionResult,
    Probabilities, ValueType, CLASS_COUNT, FEATURE_COUNT, FEATURE_SCHEMA,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, SourceError, ValidationError};
    pub use crate::types::{
        ClassLabel, FeatureMatrix, FeatureVector, PredictionResult, Probabilities,
    };
    pub use crate::validation::{validate_form_values, validate_named_fields};
}
