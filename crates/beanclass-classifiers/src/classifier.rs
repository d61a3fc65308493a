//! Classifier trait

use beanclass_core::{ClassLabel, FeatureMatrix, Probabilities, Result};

/// Trait for all bean classifiers.
///
/// Both entry points take the whole matrix at once and must return exactly
/// one entry per input row, in input order.
pub trait Classifier: Send + Sync {
    /// Predicted class per row
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<ClassLabel>>;

    /// Class probability distribution per row, indexed like `ClassLabel::ALL`
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Probabilities>>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Index of the largest probability; the first one wins ties
pub fn argmax(row: &Probabilities) -> usize {
    let mut best = 0;
    for (i, p) in row.iter().enumerate().skip(1) {
        if *p > row[best] {
            best = i;
        }
    }
    best
}
