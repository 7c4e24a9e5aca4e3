//! Per-feature min-max normalization.
//!
//! The gradient-trained models (svm, mlp) learn on wildly different feature
//! scales (probability bins next to raw file sizes), so they carry scaling
//! parameters inside the artifact and apply them at prediction time.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MinMaxScaler {
    min_vals: Vec<f32>,
    max_vals: Vec<f32>,
}

impl MinMaxScaler {
    /// Learn per-feature minima and maxima from the training matrix
    pub fn fit(x: ArrayView2<f32>) -> Self {
        let n_features = x.ncols();
        let mut min_vals = vec![f32::INFINITY; n_features];
        let mut max_vals = vec![f32::NEG_INFINITY; n_features];

        for row in x.outer_iter() {
            for (i, &v) in row.iter().enumerate() {
                min_vals[i] = min_vals[i].min(v);
                max_vals[i] = max_vals[i].max(v);
            }
        }

        // No rows: neutral parameters
        if x.nrows() == 0 {
            min_vals = vec![0.0; n_features];
            max_vals = vec![1.0; n_features];
        }

        Self { min_vals, max_vals }
    }

    /// Scale one feature row into [0, 1]; out-of-range values are clamped
    pub fn transform(&self, row: &[f32]) -> Vec<f32> {
        row.iter()
            .enumerate()
            .map(|(i, &v)| {
                let min_val = self.min_vals.get(i).copied().unwrap_or(0.0);
                let max_val = self.max_vals.get(i).copied().unwrap_or(1.0);
                let range = (max_val - min_val).max(1e-8);
                ((v - min_val) / range).clamp(0.0, 1.0)
            })
            .collect()
    }
}
