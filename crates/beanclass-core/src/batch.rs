//! Reading batch feature matrices from delimited tabular data

use crate::error::SourceError;
use crate::types::{FeatureMatrix, FeatureVector, FEATURE_COUNT, FEATURE_SCHEMA};
use std::io::Read;
use tracing::debug;

/// How CSV columns map onto the 16 schema features
#[derive(Debug, Clone, PartialEq, Eq)]
enum ColumnMapping {
    /// Header names every feature; column index per schema position
    ByName([usize; FEATURE_COUNT]),
    /// First 16 cells in order
    Positional,
}

impl ColumnMapping {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut indices = [0usize; FEATURE_COUNT];
        for (slot, field) in indices.iter_mut().zip(FEATURE_SCHEMA.iter()) {
            match headers.iter().position(|h| h == field.name) {
                Some(idx) => *slot = idx,
                None => return Self::Positional,
            }
        }
        Self::ByName(indices)
    }

    fn column(&self, feature: usize) -> usize {
        match self {
            Self::ByName(indices) => indices[feature],
            Self::Positional => feature,
        }
    }

    fn required_width(&self) -> usize {
        match self {
            Self::ByName(indices) => indices.iter().max().map_or(0, |m| m + 1),
            Self::Positional => FEATURE_COUNT,
        }
    }
}

/// Parse CSV content into a feature matrix.
///
/// The first row is always a header. An empty or header-only source yields an
/// empty matrix.
pub fn read_feature_csv<R: Read>(reader: R) -> Result<FeatureMatrix, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| SourceError::unreadable(e.to_string()))?
        .clone();
    let mapping = ColumnMapping::from_headers(&headers);
    debug!(columns = headers.len(), ?mapping, "reading feature CSV");

    let mut matrix = FeatureMatrix::default();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| SourceError::unreadable(e.to_string()))?;
        let row = i + 1;

        if record.len() < mapping.required_width() {
            return Err(SourceError::MissingColumns {
                row,
                found: record.len(),
            });
        }

        let mut values = [0.0; FEATURE_COUNT];
        for (feature, value) in values.iter_mut().enumerate() {
            let col = mapping.column(feature);
            let cell = record.get(col).unwrap_or_default();
            *value = cell.parse().map_err(|_| SourceError::NonNumeric {
                row,
                column: headers
                    .get(col)
                    .filter(|h| !h.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", col + 1)),
            })?;
        }
        matrix.push(FeatureVector::new(values));
    }

    Ok(matrix)
}

/// Parse an in-memory CSV body
pub fn read_feature_csv_bytes(bytes: &[u8]) -> Result<FeatureMatrix, SourceError> {
    read_feature_csv(bytes)
}

/// Header line listing the schema columns, for sample files and docs
pub fn schema_header() -> String {
    FEATURE_SCHEMA
        .iter()
        .map(|f| f.name)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_line() -> String {
        FEATURE_SCHEMA
            .iter()
            .map(|f| f.default)
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_rows_in_order() {
        let mut second = FeatureVector::defaults();
        second.0[0] = 52000.0;
        let second_line = second
            .0
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let csv = format!("{}\n{}\n{}\n", schema_header(), default_line(), second_line);

        let matrix = read_feature_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.rows()[0], FeatureVector::defaults());
        assert_eq!(matrix.rows()[1].get("Area"), Some(52000.0));
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(read_feature_csv_bytes(b"").unwrap().is_empty());
        let header_only = format!("{}\n", schema_header());
        assert!(read_feature_csv_bytes(header_only.as_bytes())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_named_columns_reordered_with_extra() {
        let mut names: Vec<&str> = FEATURE_SCHEMA.iter().map(|f| f.name).collect();
        let mut values: Vec<&str> = FEATURE_SCHEMA.iter().map(|f| f.default).collect();
        names.reverse();
        values.reverse();
        names.push("Class");
        values.push("SEKER");
        let csv = format!("{}\n{}\n", names.join(","), values.join(","));

        let matrix = read_feature_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(matrix.rows()[0], FeatureVector::defaults());
    }

    #[test]
    fn test_positional_when_headers_unknown() {
        let header = (1..=16).map(|i| format!("f{}", i)).collect::<Vec<_>>();
        let csv = format!("{}\n{},ignored\n", header.join(","), default_line());

        let matrix = read_feature_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(matrix.rows()[0], FeatureVector::defaults());
    }

    #[test]
    fn test_short_row() {
        let csv = format!("{}\n1,2,3\n", schema_header());
        assert_eq!(
            read_feature_csv_bytes(csv.as_bytes()),
            Err(SourceError::MissingColumns { row: 1, found: 3 })
        );
    }

    #[test]
    fn test_non_numeric_cell() {
        let line = default_line().replacen("40100", "abc", 1);
        let csv = format!("{}\n{}\n{}\n", schema_header(), default_line(), line);
        assert_eq!(
            read_feature_csv_bytes(csv.as_bytes()),
            Err(SourceError::NonNumeric {
                row: 2,
                column: "Area".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_utf8_is_unreadable() {
        let mut bytes = format!("{}\n", schema_header()).into_bytes();
        bytes.extend_from_slice(&[0xff, 0xfe, b',', b'1', b'\n']);
        assert!(matches!(
            read_feature_csv_bytes(&bytes),
            Err(SourceError::Unreadable(_))
        ));
    }
}
