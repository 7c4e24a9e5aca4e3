//! Inference Coordinator.
//!
//! Orchestrates: feature vector + algorithm selector → registry resolution →
//! readiness check → calibrated malicious probability + provenance. The
//! degenerate-fit path keeps inference from hard-failing when no trained
//! artifact exists; its output is structurally valid but statistically
//! meaningless, and the `source` field says so.

use std::path::PathBuf;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_THRESHOLD, MODEL_VERSION_TAG};
use crate::error::CoreResult;
use crate::features::FeatureVector;

use super::registry::Registry;
use super::Classifier;

/// Label treated as "malicious" when present among a model's classes
const MALICIOUS_LABEL: i32 = 1;

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Where the answering model came from, for honest confidence claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProvenance {
    /// Model type name, e.g. "RandomForestClassifier"
    pub name: String,
    /// Static artifact format version tag
    pub version: String,
    /// Requested algorithm key, or "auto" when none was given
    pub algo: String,
    /// "file" for a persisted artifact, "fallback" for a synthesized one
    pub source: String,
    /// Artifact path; None when the model was synthesized
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Probability that the input is malicious, in [0, 1]
    pub malicious_probability: f32,
    pub provenance: ModelProvenance,
}

/// Caller-side labeling policy over the returned probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Malicious,
    Benign,
}

impl Verdict {
    pub fn from_probability(probability: f32, threshold: f32) -> Self {
        if probability >= threshold {
            Verdict::Malicious
        } else {
            Verdict::Benign
        }
    }

    pub fn with_default_threshold(probability: f32) -> Self {
        Self::from_probability(probability, DEFAULT_THRESHOLD)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Malicious => "malicious",
            Verdict::Benign => "benign",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

/// Predict the malicious probability for one extracted feature vector.
///
/// Resolution never fails for an absent artifact or unknown key; an
/// untrained model is given a one-shot degenerate fit (two synthetic rows
/// derived from the input) purely so the probability interface is callable.
/// Failures from that fit, or from a corrupt artifact file, do surface.
pub fn predict(
    registry: &Registry,
    vector: &FeatureVector,
    algo: Option<&str>,
) -> CoreResult<InferenceResult> {
    let mut resolved = registry.resolve(algo)?;
    let row = vector.as_slice();

    if !resolved.model.is_trained() {
        log::warn!(
            "no trained {} artifact, running degenerate inference",
            resolved.algo.key()
        );
        degenerate_fit(&mut resolved.model, row)?;
    }

    let probs = resolved.model.predict_proba(row)?;
    let classes = resolved.model.classes();

    // Class 1 is malicious when the model knows it; otherwise the last
    // probability column, whose semantics are undefined for odd label sets.
    let malicious_index = match classes.iter().position(|&c| c == MALICIOUS_LABEL) {
        Some(index) => index,
        None => {
            log::warn!(
                "model classes {:?} lack label {}, using last probability column",
                classes,
                MALICIOUS_LABEL
            );
            probs.len().saturating_sub(1)
        }
    };
    let malicious_probability = probs.get(malicious_index).copied().unwrap_or(0.0);

    Ok(InferenceResult {
        malicious_probability,
        provenance: ModelProvenance {
            name: resolved.model.name().to_string(),
            version: MODEL_VERSION_TAG.to_string(),
            algo: algo.unwrap_or("auto").to_string(),
            source: resolved.source.as_str().to_string(),
            path: resolved.source.path().map(|p| p.to_path_buf()),
        },
    })
}

/// One-shot fit on a synthetic two-row, two-class dataset derived from the
/// input vector: the vector itself as class 0 and a near-zero perturbation
/// as class 1. Exists only to make `predict_proba` callable.
fn degenerate_fit(model: &mut super::ClassifierModel, row: &[f32]) -> CoreResult<()> {
    let n = row.len();
    let mut data = Vec::with_capacity(2 * n);
    data.extend_from_slice(row);
    data.extend(std::iter::repeat(1e-6f32).take(n));

    let x = Array2::from_shape_vec((2, n), data)
        .map_err(|e| crate::error::CoreError::ArtifactFit(e.to_string()))?;
    model.fit(x.view(), &[0, 1])
}

// ============================================================================
// TESTS
// ============================================================================
