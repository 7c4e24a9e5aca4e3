//! CART decision tree with gini impurity.
//!
//! Also provides the shared `grow_tree` builder that the random forest uses
//! with bootstrapped rows and a per-split feature subsample.

use std::cmp::Ordering;

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::constants::RANDOM_SEED;
use crate::error::{CoreError, CoreResult};

use super::{class_index, Classifier};

/// Default growth limits; deep enough to overfit small corpora on purpose,
/// matching the unconstrained reference trees.
pub(crate) const DEFAULT_MAX_DEPTH: usize = 24;
pub(crate) const DEFAULT_MIN_SAMPLES_SPLIT: usize = 2;

// ============================================================================
// TREE NODES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum Node {
    Leaf {
        /// Class probability distribution at this leaf, aligned with the
        /// model's `classes`
        probs: Vec<f32>,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub(crate) fn probs_for(&self, row: &[f32]) -> &[f32] {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { probs } => return probs,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }
}

// ============================================================================
// GROWTH
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features considered per split; `None` means all of them
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_split: DEFAULT_MIN_SAMPLES_SPLIT,
            max_features: None,
        }
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn leaf_from_counts(counts: &[usize], total: usize) -> Node {
    let probs = if total == 0 {
        vec![0.0; counts.len()]
    } else {
        counts.iter().map(|&c| c as f32 / total as f32).collect()
    };
    Node::Leaf { probs }
}

struct BestSplit {
    feature: usize,
    threshold: f32,
    impurity: f64,
}

/// Recursively grow a tree over `rows` (indices into `x`/`y_idx`).
///
/// `y_idx` holds class indices (0..n_classes), not raw labels.
pub(crate) fn grow_tree(
    x: ArrayView2<f32>,
    y_idx: &[usize],
    n_classes: usize,
    rows: &[usize],
    params: &TreeParams,
    rng: &mut StdRng,
    depth: usize,
) -> Node {
    let mut counts = vec![0usize; n_classes];
    for &r in rows {
        counts[y_idx[r]] += 1;
    }
    let total = rows.len();
    let parent_gini = gini(&counts, total);

    // Stop: pure node, too small, or depth limit
    if parent_gini == 0.0 || total < params.min_samples_split || depth >= params.max_depth {
        return leaf_from_counts(&counts, total);
    }

    let n_features = x.ncols();
    let mut feature_pool: Vec<usize> = (0..n_features).collect();
    if let Some(k) = params.max_features {
        feature_pool.shuffle(rng);
        feature_pool.truncate(k.max(1).min(n_features));
    }

    let mut best: Option<BestSplit> = None;
    let mut sorted: Vec<(f32, usize)> = Vec::with_capacity(total);

    for &feature in &feature_pool {
        sorted.clear();
        sorted.extend(rows.iter().map(|&r| (x[[r, feature]], y_idx[r])));
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut left_counts = vec![0usize; n_classes];
        let mut right_counts = counts.clone();

        for i in 0..total - 1 {
            let (value, class) = sorted[i];
            left_counts[class] += 1;
            right_counts[class] -= 1;

            let next_value = sorted[i + 1].0;
            if value >= next_value {
                continue; // no threshold separates equal values
            }

            let n_left = i + 1;
            let n_right = total - n_left;
            let weighted = (n_left as f64 * gini(&left_counts, n_left)
                + n_right as f64 * gini(&right_counts, n_right))
                / total as f64;

            if best.as_ref().map_or(weighted < parent_gini, |b| weighted < b.impurity) {
                best = Some(BestSplit {
                    feature,
                    threshold: value + (next_value - value) / 2.0,
                    impurity: weighted,
                });
            }
        }
    }

    let Some(split) = best else {
        return leaf_from_counts(&counts, total);
    };

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .copied()
        .partition(|&r| x[[r, split.feature]] <= split.threshold);

    if left_rows.is_empty() || right_rows.is_empty() {
        return leaf_from_counts(&counts, total);
    }

    let left = grow_tree(x, y_idx, n_classes, &left_rows, params, rng, depth + 1);
    let right = grow_tree(x, y_idx, n_classes, &right_rows, params, rng, depth + 1);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

// ============================================================================
// DECISION TREE MODEL
// ============================================================================

/// Single CART classifier (`dt` key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    max_depth: usize,
    min_samples_split: usize,
    classes: Vec<i32>,
    root: Option<Node>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_split: DEFAULT_MIN_SAMPLES_SPLIT,
            classes: Vec::new(),
            root: None,
        }
    }
}

impl Classifier for DecisionTree {
    fn name(&self) -> &'static str {
        "DecisionTreeClassifier"
    }

    fn is_trained(&self) -> bool {
        self.root.is_some()
    }

    fn classes(&self) -> &[i32] {
        &self.classes
    }

    fn fit(&mut self, x: ArrayView2<f32>, y: &[i32]) -> CoreResult<()> {
        let (classes, y_idx) = class_index(x, y)?;
        let rows: Vec<usize> = (0..x.nrows()).collect();
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: None,
        };
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);

        let root = grow_tree(x, &y_idx, classes.len(), &rows, &params, &mut rng, 0);
        self.classes = classes;
        self.root = Some(root);
        Ok(())
    }

    fn predict_proba(&self, row: &[f32]) -> CoreResult<Vec<f32>> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| CoreError::ArtifactFit("decision tree has not been fit".to_string()))?;
        Ok(root.probs_for(row).to_vec())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_untrained_state() {
        let tree = DecisionTree::default();
        assert!(!tree.is_trained());
        assert!(tree.classes().is_empty());
        assert!(tree.predict_proba(&[0.0]).is_err());
    }

    #[test]
    fn test_fit_separable() {
        let x = array![[0.0, 0.0], [0.1, 0.2], [0.9, 1.0], [1.0, 0.8]];
        let y = [0, 0, 1, 1];
        let mut tree = DecisionTree::default();
        tree.fit(x.view(), &y).unwrap();

        assert!(tree.is_trained());
        assert_eq!(tree.classes(), &[0, 1]);

        let p0 = tree.predict_proba(&[0.05, 0.1]).unwrap();
        let p1 = tree.predict_proba(&[0.95, 0.9]).unwrap();
        assert!(p0[0] > 0.5, "class 0 side: {:?}", p0);
        assert!(p1[1] > 0.5, "class 1 side: {:?}", p1);
    }

    #[test]
    fn test_probs_sum_to_one() {
        let x = array![[0.0], [0.0], [1.0], [1.0], [0.5]];
        let y = [0, 0, 1, 1, 0];
        let mut tree = DecisionTree::default();
        tree.fit(x.view(), &y).unwrap();

        let p = tree.predict_proba(&[0.4]).unwrap();
        let sum: f32 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_single_class_dataset() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let y = [0, 0];
        let mut tree = DecisionTree::default();
        tree.fit(x.view(), &y).unwrap();

        assert_eq!(tree.classes(), &[0]);
        assert_eq!(tree.predict_proba(&[0.0, 0.0]).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_two_row_degenerate_fit() {
        // The shape the inference fallback uses: one real row, one epsilon row
        let x = array![[0.5, 0.25, 100.0], [1e-6, 1e-6, 1e-6]];
        let y = [0, 1];
        let mut tree = DecisionTree::default();
        tree.fit(x.view(), &y).unwrap();

        let p = tree.predict_proba(&[0.5, 0.25, 100.0]).unwrap();
        assert_eq!(p.len(), 2);
        assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_mismatched_rows_rejected() {
        let x = array![[0.0], [1.0]];
        let y = [0, 1, 1];
        let mut tree = DecisionTree::default();
        assert!(tree.fit(x.view(), &y).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let x = array![[0.0, 1.0], [1.0, 0.0], [0.9, 0.1], [0.1, 0.9]];
        let y = [0, 1, 1, 0];
        let mut tree = DecisionTree::default();
        tree.fit(x.view(), &y).unwrap();

        let json = serde_json::to_string(&tree).unwrap();
        let back: DecisionTree = serde_json::from_str(&json).unwrap();
        assert!(back.is_trained());
        assert_eq!(
            back.predict_proba(&[0.0, 1.0]).unwrap(),
            tree.predict_proba(&[0.0, 1.0]).unwrap()
        );
    }
}
