//! Memoized prediction keyed on matrix content

use crate::classifier::Classifier;
use crate::predictor::{predict, ConfidenceMode, PredictionBatch};
use beanclass_core::{FeatureMatrix, MatrixFingerprint, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// A prediction, possibly served from cache
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub batch: Arc<PredictionBatch>,

    /// True if no model call was made
    pub cached: bool,
}

#[derive(Default)]
struct PredictionCache {
    entries: HashMap<MatrixFingerprint, Arc<PredictionBatch>>,
    order: VecDeque<MatrixFingerprint>,
}

/// Predictor over a shared read-only model that remembers recent answers.
///
/// Identical matrix contents map to identical results because the model
/// never changes after load, so cached batches are safe to share between
/// requests. Eviction is oldest-first once `capacity` entries exist; a
/// capacity of 0 disables caching. Failed predictions are never cached.
pub struct MemoizedPredictor {
    model: Arc<dyn Classifier>,
    mode: ConfidenceMode,
    capacity: usize,
    cache: Mutex<PredictionCache>,
}

impl MemoizedPredictor {
    pub fn new(model: Arc<dyn Classifier>, mode: ConfidenceMode, capacity: usize) -> Self {
        Self {
            model,
            mode,
            capacity,
            cache: Mutex::new(PredictionCache::default()),
        }
    }

    /// Predict, consulting the cache first
    pub fn predict(&self, features: &FeatureMatrix) -> Result<PredictionOutcome> {
        if self.capacity == 0 {
            let batch = predict(features, self.model.as_ref(), self.mode)?;
            return Ok(PredictionOutcome {
                batch: Arc::new(batch),
                cached: false,
            });
        }

        let key = features.fingerprint();
        if let Some(batch) = self.cache.lock().entries.get(&key).cloned() {
            metrics::counter!("beanclass_prediction_cache_hits_total").increment(1);
            debug!(rows = features.len(), "Prediction served from cache");
            return Ok(PredictionOutcome {
                batch,
                cached: true,
            });
        }

        // Model runs outside the lock; a racing identical request just
        // computes the same answer twice.
        let batch = Arc::new(predict(features, self.model.as_ref(), self.mode)?);

        let mut cache = self.cache.lock();
        if !cache.entries.contains_key(&key) {
            while cache.order.len() >= self.capacity {
                match cache.order.pop_front() {
                    Some(oldest) => {
                        cache.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            cache.order.push_back(key.clone());
            cache.entries.insert(key, batch.clone());
        }

        Ok(PredictionOutcome {
            batch,
            cached: false,
        })
    }

    pub fn model(&self) -> &Arc<dyn Classifier> {
        &self.model
    }

    pub fn mode(&self) -> ConfidenceMode {
        self.mode
    }

    /// Number of cached batches
    pub fn len(&self) -> usize {
        self.cache.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
