use crate::error::AppError;
use crate::models::{
    PredictQuery, PredictionResponse, PreviewResponse, ResponseFormat, SchemaResponse,
    SinglePredictRequest, UrlPredictRequest,
};
use crate::service;
use crate::source::BatchSource;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use beanclass_core::report::DOWNLOAD_FILE_NAME;
use beanclass_core::{ClassLabel, FEATURE_SCHEMA};

type QueryParams = Result<Query<PredictQuery>, QueryRejection>;

// ============================================================================
// Health and metadata
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn schema(State(state): State<AppState>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        fields: &FEATURE_SCHEMA,
        classes: ClassLabel::ALL.to_vec(),
        model: state.model.as_ref().clone(),
        confidence: state.predictor.mode(),
        sample_url: state.config.sample_url.clone(),
        max_upload_bytes: state.config.max_upload_bytes,
    })
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.render()
}

// ============================================================================
// Prediction
// ============================================================================

/// Single record from the form
pub async fn predict(
    State(state): State<AppState>,
    query: QueryParams,
    payload: Result<Json<SinglePredictRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let Json(request) = payload?;
    let response = service::predict_single(&state, request)?;
    Ok(render(response, query.format))
}

/// Uploaded CSV file sent as the raw request body
pub async fn predict_batch(
    State(state): State<AppState>,
    query: QueryParams,
    body: Bytes,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let response = service::predict_batch(&state, BatchSource::Upload(body)).await?;
    Ok(render(response, query.format))
}

/// CSV file fetched from a URL
pub async fn predict_url(
    State(state): State<AppState>,
    query: QueryParams,
    payload: Result<Json<UrlPredictRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let Json(request) = payload?;
    let response = service::predict_batch(&state, BatchSource::Url(request.url)).await?;
    Ok(render(response, query.format))
}

// ============================================================================
// Preview
// ============================================================================

/// Parsed rows of an uploaded CSV, before prediction
pub async fn preview_batch(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PreviewResponse>, AppError> {
    let preview = service::preview_batch(&state, BatchSource::Upload(body)).await?;
    Ok(Json(preview))
}

/// Parsed rows of a CSV fetched from a URL, before prediction
pub async fn preview_url(
    State(state): State<AppState>,
    payload: Result<Json<UrlPredictRequest>, JsonRejection>,
) -> Result<Json<PreviewResponse>, AppError> {
    let Json(request) = payload?;
    let preview = service::preview_batch(&state, BatchSource::Url(request.url)).await?;
    Ok(Json(preview))
}

/// JSON body, or the CSV download itself; an empty result has nothing to download
fn render(response: PredictionResponse, format: ResponseFormat) -> Response {
    match format {
        ResponseFormat::Json => Json(response).into_response(),
        ResponseFormat::Csv => match response.download_csv {
            Some(csv) => (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
                    ),
                ],
                csv,
            )
                .into_response(),
            None => StatusCode::NO_CONTENT.into_response(),
        },
    }
}
