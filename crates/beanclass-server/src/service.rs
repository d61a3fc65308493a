//! Prediction flow shared by the HTTP routes

use crate::error::AppError;
use crate::models::{PredictionResponse, PreviewResponse, SinglePredictRequest};
use crate::source::BatchSource;
use crate::state::AppState;
use beanclass_core::report::summary_sentence;
use tracing::{debug, info};

/// Validate one record and predict it
pub fn predict_single(
    state: &AppState,
    request: SinglePredictRequest,
) -> Result<PredictionResponse, AppError> {
    // Rejected forms never reach the model
    let matrix = request.into_matrix()?;
    let outcome = state.predictor.predict(&matrix)?;

    let result = outcome
        .batch
        .results
        .first()
        .copied()
        .ok_or_else(|| AppError::Internal("model returned no result".to_string()))?;

    debug!(
        label = %result.label,
        confidence = result.confidence,
        cached = outcome.cached,
        "Single prediction"
    );

    Ok(PredictionResponse::from_outcome(&outcome)?.with_summary(summary_sentence(&result)))
}

/// Resolve a batch source and predict every row in one model call
pub async fn predict_batch(
    state: &AppState,
    source: BatchSource,
) -> Result<PredictionResponse, AppError> {
    let matrix = source
        .resolve(&state.http, state.config.max_upload_bytes)
        .await?;

    if matrix.is_empty() {
        info!("Batch has no data rows, skipping prediction");
        return Ok(PredictionResponse::empty());
    }

    let rows = matrix.len();
    let predictor = state.predictor.clone();
    let outcome = tokio::task::spawn_blocking(move || predictor.predict(&matrix))
        .await
        .map_err(|e| AppError::Internal(format!("prediction task failed: {}", e)))??;

    info!(rows, cached = outcome.cached, "Batch prediction");

    PredictionResponse::from_outcome(&outcome)
}

/// Resolve a batch source for display without predicting it
pub async fn preview_batch(
    state: &AppState,
    source: BatchSource,
) -> Result<PreviewResponse, AppError> {
    let matrix = source
        .resolve(&state.http, state.config.max_upload_bytes)
        .await?;
    debug!(rows = matrix.len(), "Batch preview");
    Ok(PreviewResponse::from_matrix(&matrix))
}
