//! Core types for beanclass

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of morphological features per bean record
pub const FEATURE_COUNT: usize = 16;

/// Number of bean classes the classifier distinguishes
pub const CLASS_COUNT: usize = 7;

/// Value type of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Float,
}

/// One entry of the input schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Column / form field name
    pub name: &'static str,

    /// Pre-filled value shown in the form
    pub default: &'static str,

    /// Type the raw text must parse as
    pub value_type: ValueType,
}

const fn float_field(name: &'static str, default: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        default,
        value_type: ValueType::Float,
    }
}

/// The 16 features in model column order, with their form defaults.
pub const FEATURE_SCHEMA: [FieldSpec; FEATURE_COUNT] = [
    float_field("Area", "40100"),
    float_field("Perimeter", "717.877"),
    float_field("MajorAxisLength", "256.6991625"),
    float_field("MinorAxisLength", "216.8884621"),
    float_field("AspectRatio", "1.190425909"),
    float_field("Eccentricity", "0.524706845"),
    float_field("ConvexArea", "39925"),
    float_field("EquiDiameter", "224.6758334"),
    float_field("Extent", "0.765857899"),
    float_field("Solidity", "0.979486704"),
    float_field("Roundness", "0.92875453"),
    float_field("Compactness", "0.927781514"),
    float_field("ShapeFactor1", "0.005567479"),
    float_field("ShapeFactor2", "0.00296414"),
    float_field("ShapeFactor3", "0.896825218"),
    float_field("ShapeFactor4", "0.987852072"),
];

/// Column position of a schema field, if the name is known
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_SCHEMA.iter().position(|f| f.name == name)
}

/// A single bean's 16 features in schema order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Build from a slice, returning `None` unless it has exactly 16 values
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let values: [f64; FEATURE_COUNT] = values.try_into().ok()?;
        Some(Self(values))
    }

    /// The documented default record used to pre-fill the form
    pub fn defaults() -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (value, field) in values.iter_mut().zip(FEATURE_SCHEMA.iter()) {
            // Schema defaults are literals checked by the tests below.
            *value = field.default.parse().unwrap_or_default();
        }
        Self(values)
    }

    /// Value of a feature by schema name
    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.0[i])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Content key of a feature matrix: the exact bit pattern of every cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatrixFingerprint(Vec<u64>);

/// Ordered rows submitted for one prediction call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    rows: Vec<FeatureVector>,
}

impl FeatureMatrix {
    pub fn new(rows: Vec<FeatureVector>) -> Self {
        Self { rows }
    }

    /// Wrap a single record as a one-row matrix
    pub fn single(row: FeatureVector) -> Self {
        Self { rows: vec![row] }
    }

    pub fn push(&mut self, row: FeatureVector) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureVector> {
        self.rows.iter()
    }

    pub fn fingerprint(&self) -> MatrixFingerprint {
        MatrixFingerprint(
            self.rows
                .iter()
                .flat_map(|row| row.0.iter().map(|v| v.to_bits()))
                .collect(),
        )
    }
}

impl FromIterator<FeatureVector> for FeatureMatrix {
    fn from_iter<I: IntoIterator<Item = FeatureVector>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Dry bean class produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClassLabel {
    Barbunya,
    Bombay,
    Cali,
    Dermason,
    Horoz,
    Seker,
    Sira,
}

impl ClassLabel {
    /// All labels in classifier index order
    pub const ALL: [ClassLabel; CLASS_COUNT] = [
        Self::Barbunya,
        Self::Bombay,
        Self::Cali,
        Self::Dermason,
        Self::Horoz,
        Self::Seker,
        Self::Sira,
    ];

    /// Map a classifier output index to its label
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Barbunya => "BARBUNYA",
            Self::Bombay => "BOMBAY",
            Self::Cali => "CALI",
            Self::Dermason => "DERMASON",
            Self::Horoz => "HOROZ",
            Self::Seker => "SEKER",
            Self::Sira => "SIRA",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown bean class: {}", s))
    }
}

/// One row of `predict_proba`, indexed like [`ClassLabel::ALL`]
pub type Probabilities = [f64; CLASS_COUNT];

/// Predicted class and confidence for one input row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: ClassLabel,

    /// Max class probability as a percentage, rounded to 2 decimals
    pub confidence: f64,
}

impl PredictionResult {
    /// Build a result from a raw probability in `[0, 1]`
    pub fn from_probability(label: ClassLabel, probability: f64) -> Self {
        Self {
            label,
            confidence: to_confidence(probability),
        }
    }
}

/// Convert a probability to a percentage rounded to 2 decimals
pub fn to_confidence(probability: f64) -> f64 {
    let pct = probability * 100.0;
    ((pct * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order() {
        let names: Vec<_> = FEATURE_SCHEMA.iter().map(|f| f.name).collect();
        assert_eq!(names.first(), Some(&"Area"));
        assert_eq!(names.last(), Some(&"ShapeFactor4"));
        assert_eq!(feature_index("Extent"), Some(8));
        assert_eq!(feature_index("Class"), None);
    }

    #[test]
    fn test_schema_defaults_parse() {
        for field in FEATURE_SCHEMA.iter() {
            assert!(field.default.parse::<f64>().is_ok(), "{}", field.name);
        }
        let defaults = FeatureVector::defaults();
        assert_eq!(defaults.get("Area"), Some(40100.0));
        assert_eq!(defaults.get("ShapeFactor4"), Some(0.987852072));
    }

    #[test]
    fn test_feature_vector_from_slice() {
        assert!(FeatureVector::from_slice(&[1.0; 16]).is_some());
        assert!(FeatureVector::from_slice(&[1.0; 15]).is_none());
        assert!(FeatureVector::from_slice(&[1.0; 17]).is_none());
    }

    #[test]
    fn test_fingerprint_keys_on_content() {
        let a = FeatureMatrix::single(FeatureVector::defaults());
        let b = FeatureMatrix::single(FeatureVector::defaults());
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut changed = FeatureVector::defaults();
        changed.0[3] += 0.001;
        assert_ne!(a.fingerprint(), FeatureMatrix::single(changed).fingerprint());

        let mut two_rows = a.clone();
        two_rows.push(FeatureVector::defaults());
        assert_ne!(a.fingerprint(), two_rows.fingerprint());
    }

    #[test]
    fn test_class_label_mapping() {
        assert_eq!(ClassLabel::from_index(0), Some(ClassLabel::Barbunya));
        assert_eq!(ClassLabel::from_index(6), Some(ClassLabel::Sira));
        assert_eq!(ClassLabel::from_index(7), None);
        for (i, label) in ClassLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(label.as_str().parse::<ClassLabel>(), Ok(*label));
        }
        assert_eq!("seker".parse::<ClassLabel>(), Ok(ClassLabel::Seker));
        assert!("PINTO".parse::<ClassLabel>().is_err());
    }

    #[test]
    fn test_class_label_serde() {
        let json = serde_json::to_string(&ClassLabel::Dermason).unwrap();
        assert_eq!(json, "\"DERMASON\"");
        let label: ClassLabel = serde_json::from_str("\"HOROZ\"").unwrap();
        assert_eq!(label, ClassLabel::Horoz);
    }

    #[test]
    fn test_confidence_rounding() {
        assert_eq!(to_confidence(0.8000000000000002), 80.0);
        assert_eq!(to_confidence(1.0 / 3.0), 33.33);
        assert_eq!(to_confidence(0.98766), 98.77);
        assert_eq!(to_confidence(1.0), 100.0);
        assert_eq!(to_confidence(0.0), 0.0);
    }
}
