//! Validation and coercion of single-record form submissions

use crate::error::ValidationError;
use crate::types::{FeatureMatrix, FeatureVector, FEATURE_COUNT, FEATURE_SCHEMA};
use std::collections::HashMap;
use tracing::debug;

/// Validate 16 raw values given in schema order.
///
/// All values are checked for emptiness before any parsing happens, and all
/// 16 are parsed before a `NotNumeric` is reported.
pub fn validate_form_values<S: AsRef<str>>(
    values: &[S],
) -> Result<FeatureMatrix, ValidationError> {
    if values.len() != FEATURE_COUNT {
        return Err(ValidationError::FieldCount {
            expected: FEATURE_COUNT,
            found: values.len(),
        });
    }

    let blank = values.iter().filter(|v| v.as_ref().is_empty()).count();
    if blank != 0 {
        debug!(blank, "form rejected: blank fields");
        return Err(ValidationError::MissingField);
    }

    let parsed: Vec<Option<f64>> = values
        .iter()
        .map(|v| v.as_ref().trim().parse::<f64>().ok())
        .collect();
    let invalid = parsed.iter().filter(|v| v.is_none()).count();
    if invalid != 0 {
        debug!(invalid, "form rejected: non-numeric fields");
        return Err(ValidationError::NotNumeric);
    }

    let mut row = [0.0; FEATURE_COUNT];
    for (slot, value) in row.iter_mut().zip(parsed.into_iter().flatten()) {
        *slot = value;
    }
    Ok(FeatureMatrix::single(FeatureVector::new(row)))
}

/// Validate a submission keyed by field name.
///
/// A schema field with no entry is treated as left blank.
pub fn validate_named_fields(
    fields: &HashMap<String, String>,
) -> Result<FeatureMatrix, ValidationError> {
    if let Some(unknown) = fields
        .keys()
        .find(|name| !FEATURE_SCHEMA.iter().any(|f| f.name == name.as_str()))
    {
        return Err(ValidationError::UnknownField(unknown.clone()));
    }

    let ordered: Vec<&str> = FEATURE_SCHEMA
        .iter()
        .map(|f| fields.get(f.name).map(String::as_str).unwrap_or(""))
        .collect();
    validate_form_values(&ordered)
}
