//! Presentation of prediction results: CSV export, text table, summary line

use crate::error::{Error, Result};
use crate::types::{ClassLabel, PredictionResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;

/// Header of the exported predictions file
pub const CSV_HEADER: [&str; 2] = ["labels", "confidence"];

/// Suggested file name for downloads
pub const DOWNLOAD_FILE_NAME: &str = "preds.csv";

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    labels: ClassLabel,
    confidence: f64,
}

/// Serialize results with a `labels,confidence` header and no index column.
///
/// An empty result set yields the header line alone.
pub fn to_csv(results: &[PredictionResult]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for result in results {
        writer.serialize(CsvRow {
            labels: result.label,
            confidence: result.confidence,
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::internal(format!("flushing CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::internal(e.to_string()))
}

/// Parse an exported predictions file back into results
pub fn from_csv(text: &str) -> Result<Vec<PredictionResult>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    reader
        .deserialize::<CsvRow>()
        .map(|row| {
            let row = row?;
            Ok(PredictionResult {
                label: row.labels,
                confidence: row.confidence,
            })
        })
        .collect()
}

/// CSV for the download action, or `None` when there is nothing to offer
pub fn download_csv(results: &[PredictionResult]) -> Result<Option<String>> {
    if results.is_empty() {
        return Ok(None);
    }
    to_csv(results).map(Some)
}

/// Fixed-width text table for terminal output
pub fn render_table(results: &[PredictionResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>5}  {:<10}  {:>10}", "", CSV_HEADER[0], CSV_HEADER[1]);
    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>5}  {:<10}  {:>10.2}",
            i, result.label, result.confidence
        );
    }
    out
}

/// Human-readable sentence for single-record mode
pub fn summary_sentence(result: &PredictionResult) -> String {
    format!(
        "The predicted class is {} with a confidence of: {}%",
        result.label, result.confidence
    )
}

/// Elapsed-time feedback line
pub fn elapsed_message(elapsed: Duration) -> String {
    format!("Prediction done in: {:.2}s", elapsed.as_secs_f64())
}
