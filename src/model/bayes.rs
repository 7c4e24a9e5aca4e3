//! Gaussian naive Bayes.
//!
//! Per-class feature means and variances with a variance-smoothing floor,
//! class priors from label frequencies, posteriors via log-sum-exp.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

use super::{class_index, Classifier};

/// Portion of the largest feature variance added to every variance,
/// so constant features do not produce a zero denominator
const VAR_SMOOTHING: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GaussianNb {
    classes: Vec<i32>,
    /// Log class priors, aligned with `classes`
    log_priors: Vec<f64>,
    /// Per class: feature means
    means: Vec<Vec<f64>>,
    /// Per class: smoothed feature variances
    variances: Vec<Vec<f64>>,
}

impl Classifier for GaussianNb {
    fn name(&self) -> &'static str {
        "GaussianNB"
    }

    fn is_trained(&self) -> bool {
        !self.classes.is_empty()
    }

    fn classes(&self) -> &[i32] {
        &self.classes
    }

    fn fit(&mut self, x: ArrayView2<f32>, y: &[i32]) -> CoreResult<()> {
        let (classes, y_idx) = class_index(x, y)?;
        let n_classes = classes.len();
        let n_features = x.ncols();
        let n_rows = x.nrows();

        let mut counts = vec![0usize; n_classes];
        let mut means = vec![vec![0.0f64; n_features]; n_classes];
        for (row, &c) in x.outer_iter().zip(&y_idx) {
            counts[c] += 1;
            for (m, &v) in means[c].iter_mut().zip(row.iter()) {
                *m += v as f64;
            }
        }
        for (mean_row, &count) in means.iter_mut().zip(&counts) {
            for m in mean_row.iter_mut() {
                *m /= count as f64;
            }
        }

        let mut variances = vec![vec![0.0f64; n_features]; n_classes];
        for (row, &c) in x.outer_iter().zip(&y_idx) {
            for ((var, &mean), &v) in variances[c].iter_mut().zip(&means[c]).zip(row.iter()) {
                let d = v as f64 - mean;
                *var += d * d;
            }
        }
        let mut max_variance = 0.0f64;
        for (var_row, &count) in variances.iter_mut().zip(&counts) {
            for var in var_row.iter_mut() {
                *var /= count as f64;
                max_variance = max_variance.max(*var);
            }
        }
        // Smoothing floor keeps the densities finite for constant features
        let epsilon = VAR_SMOOTHING * max_variance.max(1.0);
        for var_row in &mut variances {
            for var in var_row.iter_mut() {
                *var += epsilon;
            }
        }

        self.log_priors = counts
            .iter()
            .map(|&c| (c as f64 / n_rows as f64).ln())
            .collect();
        self.classes = classes;
        self.means = means;
        self.variances = variances;
        Ok(())
    }

    fn predict_proba(&self, row: &[f32]) -> CoreResult<Vec<f32>> {
        if self.classes.is_empty() {
            return Err(CoreError::ArtifactFit(
                "naive Bayes model has not been fit".to_string(),
            ));
        }

        let mut log_posteriors = Vec::with_capacity(self.classes.len());
        for c in 0..self.classes.len() {
            let mut log_p = self.log_priors[c];
            for (f, (&mean, &var)) in self.means[c].iter().zip(&self.variances[c]).enumerate() {
                let v = row.get(f).copied().unwrap_or(0.0) as f64;
                let d = v - mean;
                log_p += -0.5 * ((2.0 * std::f64::consts::PI * var).ln() + d * d / var);
            }
            log_posteriors.push(log_p);
        }

        // log-sum-exp normalization
        let max_log = log_posteriors
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let mut probs: Vec<f64> = log_posteriors.iter().map(|&l| (l - max_log).exp()).collect();
        let sum: f64 = probs.iter().sum();
        if sum > 0.0 {
            for p in &mut probs {
                *p /= sum;
            }
        }

        Ok(probs.into_iter().map(|p| p as f32).collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
