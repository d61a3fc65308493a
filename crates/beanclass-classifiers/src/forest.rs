//! Random forest inference over a serialized, pre-trained artifact.
//!
//! The artifact mirrors scikit-learn's per-tree arrays (`children_left`,
//! `children_right`, `feature`, `threshold`, `value`), so an exported
//! `RandomForestClassifier` can be served without a Python runtime. Training
//! is out of scope; this module only validates and evaluates.
//!
//! Probabilities follow scikit-learn: each tree contributes its leaf's
//! normalized class weights and the forest averages them.

use crate::classifier::{argmax, Classifier};
use beanclass_core::{
    ClassLabel, Error, FeatureMatrix, FeatureVector, Probabilities, Result, CLASS_COUNT,
    FEATURE_COUNT,
};
use serde::{Deserialize, Serialize};

/// On-disk form of a forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    pub n_features: usize,

    /// Class names in output index order
    pub classes: Vec<String>,

    pub trees: Vec<TreeArtifact>,
}

/// On-disk form of one tree; all arrays are indexed by node id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    /// `-1` marks a leaf
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-class sample weights reaching each node
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(Probabilities),
}

/// A validated decision tree
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Validate a tree artifact.
    ///
    /// Children must come after their parent (scikit-learn's depth-first
    /// layout), which also rules out cycles.
    pub fn from_artifact(tree: &TreeArtifact) -> std::result::Result<Self, String> {
        let n = tree.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if tree.children_right.len() != n
            || tree.feature.len() != n
            || tree.threshold.len() != n
            || tree.value.len() != n
        {
            return Err("inconsistent array lengths".into());
        }

        let mut nodes = Vec::with_capacity(n);
        for id in 0..n {
            let left = tree.children_left[id];
            let right = tree.children_right[id];

            if left < 0 {
                if right >= 0 {
                    return Err(format!("node {} has a right child but no left child", id));
                }
                nodes.push(TreeNode::Leaf(normalize(&tree.value[id], id)?));
                continue;
            }

            let child = |c: i64| -> std::result::Result<usize, String> {
                let c = usize::try_from(c)
                    .map_err(|_| format!("node {} has a negative child index", id))?;
                if c <= id || c >= n {
                    return Err(format!("node {} has out-of-order child {}", id, c));
                }
                Ok(c)
            };
            let feature = usize::try_from(tree.feature[id])
                .ok()
                .filter(|f| *f < FEATURE_COUNT)
                .ok_or_else(|| {
                    format!("node {} splits on invalid feature {}", id, tree.feature[id])
                })?;

            nodes.push(TreeNode::Split {
                feature,
                threshold: tree.threshold[id],
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    /// Leaf distribution for one sample; `x <= threshold` goes left
    pub fn predict_proba(&self, row: &FeatureVector) -> &Probabilities {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf(proba) => return proba,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row.0[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Number of nodes in the tree
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}

fn normalize(weights: &[f64], id: usize) -> std::result::Result<Probabilities, String> {
    if weights.len() != CLASS_COUNT {
        return Err(format!(
            "leaf {} has {} class weights, expected {}",
            id,
            weights.len(),
            CLASS_COUNT
        ));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(format!("leaf {} has invalid class weights", id));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(format!("leaf {} has zero total weight", id));
    }

    let mut proba = [0.0; CLASS_COUNT];
    for (p, w) in proba.iter_mut().zip(weights) {
        *p = w / total;
    }
    Ok(proba)
}

/// Ensemble of decision trees averaging leaf distributions
#[derive(Debug, Clone)]
pub struct RandomForest {
    name: String,
    version: Option<String>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Validate an artifact against the bean feature and class schema
    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self> {
        if artifact.n_features != FEATURE_COUNT {
            return Err(Error::model_load(format!(
                "model expects {} features, input schema has {}",
                artifact.n_features, FEATURE_COUNT
            )));
        }

        let expected: Vec<&str> = ClassLabel::ALL.iter().map(|c| c.as_str()).collect();
        if artifact.classes != expected {
            return Err(Error::model_load(format!(
                "model classes {:?} do not match {:?}",
                artifact.classes, expected
            )));
        }

        if artifact.trees.is_empty() {
            return Err(Error::model_load("empty forest"));
        }

        let trees = artifact
            .trees
            .iter()
            .enumerate()
            .map(|(i, t)| {
                DecisionTree::from_artifact(t)
                    .map_err(|e| Error::model_load(format!("tree {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: artifact.name,
            version: artifact.version,
            trees,
        })
    }

    /// Mean of the per-tree leaf distributions for one sample
    pub fn predict_proba_row(&self, row: &FeatureVector) -> Probabilities {
        let mut sum = [0.0; CLASS_COUNT];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.predict_proba(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        sum.map(|s| s / n)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Total node count across all trees
    pub fn n_nodes(&self) -> usize {
        self.trees.iter().map(DecisionTree::n_nodes).sum()
    }
}

impl Classifier for RandomForest {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<ClassLabel>> {
        features
            .iter()
            .map(|row| {
                let idx = argmax(&self.predict_proba_row(row));
                ClassLabel::from_index(idx)
                    .ok_or_else(|| Error::invocation(format!("class index {} out of range", idx)))
            })
            .collect()
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Probabilities>> {
        Ok(features.iter().map(|row| self.predict_proba_row(row)).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
