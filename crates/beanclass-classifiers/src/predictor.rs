//! Batched prediction over a classifier

use crate::classifier::Classifier;
use beanclass_core::{Error, FeatureMatrix, PredictionResult, Probabilities, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::debug;

/// How a row's confidence is derived from the probability matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidenceMode {
    /// Max probability of each row
    #[default]
    PerRow,
    /// Max over the whole batch, identical for every row (legacy behavior)
    BatchMax,
}

impl ConfidenceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerRow => "per-row",
            Self::BatchMax => "batch-max",
        }
    }
}

impl fmt::Display for ConfidenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per-row" | "per_row" | "row" => Ok(Self::PerRow),
            "batch-max" | "batch_max" | "legacy" => Ok(Self::BatchMax),
            _ => Err(format!(
                "Invalid confidence mode: {}. Use 'per-row' or 'batch-max'",
                s
            )),
        }
    }
}

/// Results of one prediction call
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionBatch {
    /// One result per input row, in input order
    pub results: Vec<PredictionResult>,

    /// Wall-clock time spent in the classifier
    pub elapsed: Duration,
}

/// Run the classifier once over the whole matrix.
///
/// The model's `predict` and `predict_proba` are each called exactly once.
/// An empty matrix is rejected without touching the model.
pub fn predict(
    features: &FeatureMatrix,
    model: &dyn Classifier,
    mode: ConfidenceMode,
) -> Result<PredictionBatch> {
    if features.is_empty() {
        return Err(Error::EmptyInput);
    }

    let start = Instant::now();
    let labels = model.predict(features).map_err(invocation_error)?;
    let probabilities = model.predict_proba(features).map_err(invocation_error)?;

    if labels.len() != features.len() || probabilities.len() != features.len() {
        return Err(Error::invocation(format!(
            "model returned {} labels and {} probability rows for {} inputs",
            labels.len(),
            probabilities.len(),
            features.len()
        )));
    }

    let batch_max = probabilities.iter().map(row_max).fold(0.0_f64, f64::max);

    let results = labels
        .into_iter()
        .zip(&probabilities)
        .map(|(label, row)| {
            let probability = match mode {
                ConfidenceMode::PerRow => row_max(row),
                ConfidenceMode::BatchMax => batch_max,
            };
            PredictionResult::from_probability(label, probability)
        })
        .collect::<Vec<_>>();

    let elapsed = start.elapsed();

    metrics::counter!("beanclass_predictions_total", "mode" => mode.as_str()).increment(1);
    metrics::counter!("beanclass_predicted_rows_total").increment(results.len() as u64);
    metrics::histogram!("beanclass_prediction_latency_us").record(elapsed.as_micros() as f64);

    debug!(
        model = model.name(),
        rows = results.len(),
        %mode,
        elapsed_us = elapsed.as_micros() as u64,
        "Prediction complete"
    );

    Ok(PredictionBatch { results, elapsed })
}

fn row_max(row: &Probabilities) -> f64 {
    row.iter().copied().fold(0.0_f64, f64::max)
}

fn invocation_error(err: Error) -> Error {
    match err {
        Error::Invocation(_) => err,
        other => Error::invocation(other.to_string()),
    }
}
