//! Multi-layer perceptron (`mlp` key).
//!
//! One relu hidden layer and a sigmoid output head, trained with plain SGD
//! on the logistic loss over min-max scaled features. Seeded weight init so
//! training is reproducible. Binary only, like the svm.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::RANDOM_SEED;
use crate::error::{CoreError, CoreResult};

use super::scaling::MinMaxScaler;
use super::{class_index, Classifier};

const HIDDEN_UNITS: usize = 64;
const EPOCHS: usize = 200;
const LEARNING_RATE: f64 = 0.05;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MlpClassifier {
    classes: Vec<i32>,
    /// Hidden weights, row-major [HIDDEN_UNITS x n_features]
    w1: Vec<f64>,
    b1: Vec<f64>,
    /// Output weights, one per hidden unit
    w2: Vec<f64>,
    b2: f64,
    n_features: usize,
    scaler: MinMaxScaler,
    trained: bool,
}

impl MlpClassifier {
    /// Forward pass; returns (hidden activations, output probability)
    fn forward(&self, scaled: &[f32]) -> (Vec<f64>, f64) {
        let mut hidden = vec![0.0f64; self.b1.len()];
        for (h, (bias, weights)) in hidden
            .iter_mut()
            .zip(self.b1.iter().zip(self.w1.chunks(self.n_features)))
        {
            let mut sum = *bias;
            for (&w, &v) in weights.iter().zip(scaled) {
                sum += w * v as f64;
            }
            *h = sum.max(0.0); // relu
        }

        let mut out = self.b2;
        for (&w, &h) in self.w2.iter().zip(&hidden) {
            out += w * h;
        }
        let p = 1.0 / (1.0 + (-out).exp());
        (hidden, p)
    }
}

impl Classifier for MlpClassifier {
    fn name(&self) -> &'static str {
        "MlpClassifier"
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
                "mlp supports binary labels, got {} classes",
                classes.len()
            )));
        }

        let n_features = x.ncols();
        let scaler = MinMaxScaler::fit(x);

        if classes.len() == 1 {
            self.classes = classes;
            self.w1 = vec![0.0; HIDDEN_UNITS * n_features];
            self.b1 = vec![0.0; HIDDEN_UNITS];
            self.w2 = vec![0.0; HIDDEN_UNITS];
            self.b2 = 0.0;
            self.n_features = n_features;
            self.scaler = scaler;
            self.trained = true;
            return Ok(());
        }

        let scaled: Vec<Vec<f32>> = x
            .outer_iter()
            .map(|r| {
                let row: Vec<f32> = r.iter().copied().collect();
                scaler.transform(&row)
            })
            .collect();
        let targets: Vec<f64> = y_idx.iter().map(|&c| c as f64).collect();

        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
        let limit = (6.0 / (n_features + HIDDEN_UNITS) as f64).sqrt();
        self.w1 = (0..HIDDEN_UNITS * n_features)
            .map(|_| rng.gen_range(-limit..limit))
            .collect();
        self.b1 = vec![0.0; HIDDEN_UNITS];
        let out_limit = (6.0 / (HIDDEN_UNITS + 1) as f64).sqrt();
        self.w2 = (0..HIDDEN_UNITS).map(|_| rng.gen_range(-out_limit..out_limit)).collect();
        self.b2 = 0.0;
        self.n_features = n_features;

        let mut order: Vec<usize> = (0..scaled.len()).collect();

        for _ in 0..EPOCHS {
            order.shuffle(&mut rng);
            for &i in &order {
                let row = &scaled[i];
                let (hidden, p) = self.forward(row);

                // d(logistic loss)/d(pre-sigmoid) = p - target
                let delta_out = p - targets[i];

                // Hidden-layer gradients need the pre-update output weights
                let w2_old = self.w2.clone();
                for (w, &h) in self.w2.iter_mut().zip(&hidden) {
                    *w -= LEARNING_RATE * delta_out * h;
                }
                self.b2 -= LEARNING_RATE * delta_out;

                for (unit, (&h, &w2)) in hidden.iter().zip(&w2_old).enumerate() {
                    if h <= 0.0 {
                        continue; // relu gradient is zero
                    }
                    let delta_hidden = delta_out * w2;
                    let weights = &mut self.w1[unit * self.n_features..(unit + 1) * self.n_features];
                    for (w, &v) in weights.iter_mut().zip(row) {
                        *w -= LEARNING_RATE * delta_hidden * v as f64;
                    }
                    self.b1[unit] -= LEARNING_RATE * delta_hidden;
                }
            }
        }

        self.classes = classes;
        self.scaler = scaler;
        self.trained = true;
        Ok(())
    }

    fn predict_proba(&self, row: &[f32]) -> CoreResult<Vec<f32>> {
        if !self.trained {
            return Err(CoreError::ArtifactFit("mlp has not been fit".to_string()));
        }
        if self.classes.len() == 1 {
            return Ok(vec![1.0]);
        }

        let scaled = self.scaler.transform(row);
        let (_, p) = self.forward(&scaled);
        Ok(vec![1.0 - p as f32, p as f32])
    }
}

// ============================================================================
// TESTS
// ============================================================================
