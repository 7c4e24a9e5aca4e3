//! Random forest: bagged CART trees with per-split feature subsampling.
//!
//! Bootstrap rows per tree, sqrt(n_features) candidates per split, averaged
//! leaf distributions at prediction time. Seeded, so retraining on the same
//! data reproduces the same forest.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::RANDOM_SEED;
use crate::error::{CoreError, CoreResult};

use super::tree::{grow_tree, Node, TreeParams, DEFAULT_MIN_SAMPLES_SPLIT};
use super::{class_index, Classifier};

/// Number of trees in the ensemble
const DEFAULT_N_TREES: usize = 100;

/// Depth cap per tree; bagged trees stay shallower than the single CART
const FOREST_MAX_DEPTH: usize = 16;

/// Random forest classifier (`rf` key, the default algorithm).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_trees: usize,
    classes: Vec<i32>,
    trees: Vec<Node>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            classes: Vec::new(),
            trees: Vec::new(),
        }
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &'static str {
        "RandomForestClassifier"
    }

    fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    fn classes(&self) -> &[i32] {
        &self.classes
    }

    fn fit(&mut self, x: ArrayView2<f32>, y: &[i32]) -> CoreResult<()> {
        let (classes, y_idx) = class_index(x, y)?;
        let n_rows = x.nrows();
        let max_features = (x.ncols() as f64).sqrt().round().max(1.0) as usize;
        let params = TreeParams {
            max_depth: FOREST_MAX_DEPTH,
            min_samples_split: DEFAULT_MIN_SAMPLES_SPLIT,
            max_features: Some(max_features),
        };

        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
        let mut trees = Vec::with_capacity(self.n_trees);

        for _ in 0..self.n_trees {
            // Bootstrap sample, same size as the original
            let rows: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            trees.push(grow_tree(
                x,
                &y_idx,
                classes.len(),
                &rows,
                &params,
                &mut rng,
                0,
            ));
        }

        self.classes = classes;
        self.trees = trees;
        Ok(())
    }

    fn predict_proba(&self, row: &[f32]) -> CoreResult<Vec<f32>> {
        if self.trees.is_empty() {
            return Err(CoreError::ArtifactFit(
                "random forest has not been fit".to_string(),
            ));
        }

        let mut probs = vec![0.0f32; self.classes.len()];
        for tree in &self.trees {
            for (acc, &p) in probs.iter_mut().zip(tree.probs_for(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f32;
        for p in &mut probs {
            *p /= n;
        }
        Ok(probs)
    }
}

// ============================================================================
// TESTS
// ============================================================================
