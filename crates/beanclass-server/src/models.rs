//! Request and response bodies for the HTTP API

use crate::error::AppError;
use beanclass_classifiers::{ConfidenceMode, ModelMetadata, PredictionOutcome};
use beanclass_core::validation::{validate_form_values, validate_named_fields};
use beanclass_core::{
    report, ClassLabel, FeatureMatrix, FeatureVector, FieldSpec, PredictionResult, FEATURE_SCHEMA,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A form cell as sent by a client: the text of the field, or a JSON number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn into_text(self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s,
        }
    }
}

/// Single-record submission, either by field name or in schema order
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SinglePredictRequest {
    #[serde(default)]
    pub fields: Option<HashMap<String, FieldValue>>,

    #[serde(default)]
    pub values: Option<Vec<FieldValue>>,
}

impl SinglePredictRequest {
    /// Validate into a one-row matrix
    pub fn into_matrix(self) -> Result<FeatureMatrix, AppError> {
        match (self.fields, self.values) {
            (Some(fields), None) => {
                let fields: HashMap<String, String> = fields
                    .into_iter()
                    .map(|(name, value)| (name, value.into_text()))
                    .collect();
                Ok(validate_named_fields(&fields)?)
            }
            (None, Some(values)) => {
                let values: Vec<String> = values.into_iter().map(FieldValue::into_text).collect();
                Ok(validate_form_values(&values)?)
            }
            _ => Err(AppError::InvalidRequest(
                "expected exactly one of `fields` or `values`".to_string(),
            )),
        }
    }
}

/// Batch submission by URL
#[derive(Debug, Clone, Deserialize)]
pub struct UrlPredictRequest {
    pub url: String,
}

/// `?format=` on the predict routes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictQuery {
    #[serde(default)]
    pub format: ResponseFormat,
}

/// Result of any predict route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub request_id: String,

    /// One entry per input row, in input order
    pub predictions: Vec<PredictionResult>,

    /// Time spent in the model
    pub elapsed_ms: f64,

    /// True if served from the prediction cache
    pub cached: bool,

    /// Sentence for single-record mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// `labels,confidence` CSV; absent when there are no predictions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_csv: Option<String>,
}

impl PredictionResponse {
    pub fn from_outcome(outcome: &PredictionOutcome) -> Result<Self, AppError> {
        let predictions = outcome.batch.results.clone();
        let download_csv = report::download_csv(&predictions)?;
        Ok(Self {
            request_id: Uuid::new_v4().to_string(),
            elapsed_ms: outcome.batch.elapsed.as_secs_f64() * 1000.0,
            cached: outcome.cached,
            summary: None,
            download_csv,
            predictions,
        })
    }

    /// Response for a batch with no data rows
    pub fn empty() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            predictions: Vec::new(),
            elapsed_ms: 0.0,
            cached: false,
            summary: None,
            download_csv: None,
        }
    }

    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = Some(summary);
        self
    }
}

/// Rows returned by the preview routes
pub const PREVIEW_ROWS: usize = 100;

/// Parsed batch shown to the user before they predict it
#[derive(Debug, Clone, Serialize)]
pub struct PreviewResponse {
    /// Schema column names, in the order of each row's values
    pub columns: Vec<&'static str>,

    /// At most `PREVIEW_ROWS` leading rows
    pub rows: Vec<FeatureVector>,

    /// Data rows in the whole source
    pub total_rows: usize,
}

impl PreviewResponse {
    pub fn from_matrix(matrix: &FeatureMatrix) -> Self {
        Self {
            columns: FEATURE_SCHEMA.iter().map(|f| f.name).collect(),
            rows: matrix.iter().take(PREVIEW_ROWS).copied().collect(),
            total_rows: matrix.len(),
        }
    }
}

/// Input schema, labels, and model description for clients
#[derive(Debug, Clone, Serialize)]
pub struct SchemaResponse {
    pub fields: &'static [FieldSpec],
    pub classes: Vec<ClassLabel>,
    pub model: ModelMetadata,
    pub confidence: ConfidenceMode,
    pub sample_url: String,
    pub max_upload_bytes: usize,
}
