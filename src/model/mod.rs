//! Model Module - Trainable Classifier Family
//!
//! Five interchangeable classifiers behind one trait, resolved through a
//! closed enum so the algorithm-key → constructor mapping is total and
//! checked at compile time. Persistence, inference orchestration and
//! training live in the submodules.

pub mod bayes;
pub mod forest;
pub mod infer;
pub mod metrics;
pub mod mlp;
pub mod registry;
pub mod scaling;
pub mod svm;
pub mod train;
pub mod tree;

#[cfg(test)]
mod tests;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub use infer::{predict, InferenceResult, ModelProvenance, Verdict};
pub use registry::{ArtifactSource, Registry, RegistryConfig, ResolvedArtifact};
pub use train::{train, DatasetSource, TrainingReport};

// ============================================================================
// ALGORITHM KEYS
// ============================================================================

/// The fixed set of supported classifier algorithms.
///
/// Keys and artifact filenames form the external vocabulary; adding a
/// variant here forces every dispatch site to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    Forest,
    Tree,
    Svm,
    Bayes,
    Mlp,
}

impl Algorithm {
    /// All supported algorithms, in training order
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Forest,
        Algorithm::Tree,
        Algorithm::Svm,
        Algorithm::Bayes,
        Algorithm::Mlp,
    ];

    /// Default algorithm when none is requested
    pub const DEFAULT: Algorithm = Algorithm::Forest;

    /// Short key exposed to callers
    pub fn key(self) -> &'static str {
        match self {
            Algorithm::Forest => "rf",
            Algorithm::Tree => "dt",
            Algorithm::Svm => "svm",
            Algorithm::Bayes => "nb",
            Algorithm::Mlp => "mlp",
        }
    }

    /// Canonical artifact filename for this algorithm
    pub fn artifact_filename(self) -> &'static str {
        match self {
            Algorithm::Forest => "model_rf.json",
            Algorithm::Tree => "model_dt.json",
            Algorithm::Svm => "model_svm.json",
            Algorithm::Bayes => "model_nb.json",
            Algorithm::Mlp => "model_mlp.json",
        }
    }

    /// Strict key parse - unknown keys are a caller error (training path)
    pub fn from_key(key: &str) -> CoreResult<Algorithm> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.key() == key)
            .ok_or_else(|| CoreError::UnknownAlgorithm {
                key: key.to_string(),
            })
    }

    /// Lenient key parse - unknown keys resolve to the default (inference
    /// path only; absence of a real artifact should degrade, not fail).
    pub fn from_key_lenient(key: &str) -> Algorithm {
        match Algorithm::from_key(key) {
            Ok(algo) => algo,
            Err(_) => {
                log::warn!("unrecognized algorithm key '{}', using '{}'", key, Algorithm::DEFAULT.key());
                Algorithm::DEFAULT
            }
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Common contract for the trainable classifiers.
///
/// `fit` learns from a row-major matrix of feature vectors plus integer
/// class labels; `predict_proba` returns one probability per learned class,
/// aligned with `classes()`.
pub trait Classifier {
    /// Model type name for provenance
    fn name(&self) -> &'static str;

    /// Whether `fit` has completed at least once
    fn is_trained(&self) -> bool;

    /// Learned class labels, ascending. Empty before training.
    fn classes(&self) -> &[i32];

    /// Train on the full dataset
    fn fit(&mut self, x: ArrayView2<f32>, y: &[i32]) -> CoreResult<()>;

    /// Class-conditional probabilities for a single feature row
    fn predict_proba(&self, row: &[f32]) -> CoreResult<Vec<f32>>;
}

// ============================================================================
// CLOSED DISPATCH
// ============================================================================

/// Tagged union of the concrete models, used for persistence and dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ClassifierModel {
    Forest(forest::RandomForest),
    Tree(tree::DecisionTree),
    Svm(svm::LinearSvm),
    Bayes(bayes::GaussianNb),
    Mlp(mlp::MlpClassifier),
}

impl ClassifierModel {
    /// Construct a fresh, untrained model of the requested kind
    pub fn untrained(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Forest => ClassifierModel::Forest(forest::RandomForest::default()),
            Algorithm::Tree => ClassifierModel::Tree(tree::DecisionTree::default()),
            Algorithm::Svm => ClassifierModel::Svm(svm::LinearSvm::default()),
            Algorithm::Bayes => ClassifierModel::Bayes(bayes::GaussianNb::default()),
            Algorithm::Mlp => ClassifierModel::Mlp(mlp::MlpClassifier::default()),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            ClassifierModel::Forest(m) => m,
            ClassifierModel::Tree(m) => m,
            ClassifierModel::Svm(m) => m,
            ClassifierModel::Bayes(m) => m,
            ClassifierModel::Mlp(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            ClassifierModel::Forest(m) => m,
            ClassifierModel::Tree(m) => m,
            ClassifierModel::Svm(m) => m,
            ClassifierModel::Bayes(m) => m,
            ClassifierModel::Mlp(m) => m,
        }
    }
}

impl Classifier for ClassifierModel {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn is_trained(&self) -> bool {
        self.inner().is_trained()
    }

    fn classes(&self) -> &[i32] {
        self.inner().classes()
    }

    fn fit(&mut self, x: ArrayView2<f32>, y: &[i32]) -> CoreResult<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict_proba(&self, row: &[f32]) -> CoreResult<Vec<f32>> {
        self.inner().predict_proba(row)
    }
}

// ============================================================================
// SHARED FIT HELPERS
// ============================================================================

/// Sorted unique class labels plus per-row class indices.
/// Errors when the dataset is empty or rows/labels disagree.
pub(crate) fn class_index(x: ArrayView2<f32>, y: &[i32]) -> CoreResult<(Vec<i32>, Vec<usize>)> {
    if y.is_empty() || x.nrows() == 0 {
        return Err(CoreError::InvalidDataset("empty training set".to_string()));
    }
    if x.ncols() == 0 {
        return Err(CoreError::InvalidDataset(
            "training rows have no feature columns".to_string(),
        ));
    }
    if x.nrows() != y.len() {
        return Err(CoreError::InvalidDataset(format!(
            "{} feature rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }

    let mut classes: Vec<i32> = y.to_vec();
    classes.sort_unstable();
    classes.dedup();

    let indices = y
        .iter()
        .map(|label| classes.binary_search(label).unwrap_or(0))
        .collect();

    Ok((classes, indices))
}
