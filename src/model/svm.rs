//! Linear support vector machine (`svm` key).
//!
//! Pegasos-style SGD on the hinge loss over min-max scaled features, with a
//! sigmoid over the signed margin as the probability calibration. Binary
//! only; the positive side is the higher class label.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::constants::RANDOM_SEED;
use crate::error::{CoreError, CoreResult};

use super::scaling::MinMaxScaler;
use super::{class_index, Classifier};

const EPOCHS: usize = 100;
const LAMBDA: f64 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LinearSvm {
    classes: Vec<i32>,
    weights: Vec<f64>,
    bias: f64,
    scaler: MinMaxScaler,
    trained: bool,
}

impl LinearSvm {
    fn margin(&self, scaled: &[f32]) -> f64 {
        let dot: f64 = self
            .weights
            .iter()
            .zip(scaled)
            .map(|(&w, &v)| w * v as f64)
            .sum();
        dot + self.bias
    }
}

impl Classifier for LinearSvm {
    fn name(&self) -> &'static str {
        "LinearSvmClassifier"
    }

    fn is_trained(&self) -> bool {
        self.trained
    }

    fn classes(&self) -> &[i32] {
        &self.classes
    }

    fn fit(&mut self, x: ArrayView2<f32>, y: &[i32]) -> CoreResult<()> {
        let (classes, y_idx) = class_index(x, y)?;
        if classes.len() > 2 {
            return Err(CoreError::ArtifactFit(format!(
                "svm supports binary labels, got {} classes",
                classes.len()
            )));
        }

        let scaler = MinMaxScaler::fit(x);
        let n_rows = x.nrows();
        let n_features = x.ncols();

        // Single-class corpus: nothing to separate, the constant prior wins
        if classes.len() == 1 {
            self.classes = classes;
            self.weights = vec![0.0; n_features];
            self.bias = 0.0;
            self.scaler = scaler;
            self.trained = true;
            return Ok(());
        }

        let scaled: Vec<Vec<f32>> = x.outer_iter().map(|r| {
            let row: Vec<f32> = r.iter().copied().collect();
            scaler.transform(&row)
        }).collect();
        // Class index 0 → -1, class index 1 → +1
        let targets: Vec<f64> = y_idx.iter().map(|&c| if c == 0 { -1.0 } else { 1.0 }).collect();

        let mut weights = vec![0.0f64; n_features];
        let mut bias = 0.0f64;
        let mut order: Vec<usize> = (0..n_rows).collect();
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
        let mut t = 0usize;

        for _ in 0..EPOCHS {
            order.shuffle(&mut rng);
            for &i in &order {
                t += 1;
                let eta = 1.0 / (LAMBDA * t as f64);
                let row = &scaled[i];
                let target = targets[i];
                let dot: f64 = weights.iter().zip(row).map(|(&w, &v)| w * v as f64).sum();
                let decision = target * (dot + bias);

                let shrink = 1.0 - eta * LAMBDA;
                for w in &mut weights {
                    *w *= shrink;
                }
                if decision < 1.0 {
                    for (w, &v) in weights.iter_mut().zip(row) {
                        *w += eta * target * v as f64;
                    }
                    bias += eta * target;
                }
            }
        }

        self.classes = classes;
        self.weights = weights;
        self.bias = bias;
        self.scaler = scaler;
        self.trained = true;
        Ok(())
    }

    fn predict_proba(&self, row: &[f32]) -> CoreResult<Vec<f32>> {
        if !self.trained {
            return Err(CoreError::ArtifactFit("svm has not been fit".to_string()));
        }
        if self.classes.len() == 1 {
            return Ok(vec![1.0]);
        }

        let scaled = self.scaler.transform(row);
        let margin = self.margin(&scaled);
        let p_positive = 1.0 / (1.0 + (-margin).exp());
        Ok(vec![1.0 - p_positive as f32, p_positive as f32])
    }
}

// ============================================================================
// TESTS
// ============================================================================
