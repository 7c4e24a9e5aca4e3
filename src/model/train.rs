//! Training Coordinator.
//!
//! Loads a dataset from one of the pluggable sources, fits one or all of
//! the classifier kinds, evaluates each on a held-out partition, and
//! persists the fitted models through the registry. Unlike inference, an
//! unknown algorithm key here is a hard error - training against a bogus
//! key is a caller mistake worth surfacing.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::constants::RANDOM_SEED;
use crate::dataset::{csv, samples, Dataset};
use crate::error::CoreResult;

use super::metrics::classification_report;
use super::registry::Registry;
use super::{Algorithm, Classifier, ClassifierModel};

/// Held-out fraction for evaluation
const TEST_FRACTION: f64 = 0.25;

// ============================================================================
// INPUTS / OUTPUTS
// ============================================================================

/// Where training data comes from
#[derive(Debug, Clone)]
pub enum DatasetSource {
    /// Feature CSV with a `label` column
    Csv(PathBuf),
    /// Benign/malware directory pair, pushed through the extractor
    Samples {
        benign_dir: PathBuf,
        malware_dir: PathBuf,
    },
}

impl DatasetSource {
    fn load(&self) -> CoreResult<Dataset> {
        match self {
            DatasetSource::Csv(path) => csv::load_csv(path),
            DatasetSource::Samples {
                benign_dir,
                malware_dir,
            } => samples::load_dataset(benign_dir, malware_dir),
        }
    }
}

/// Outcome of training one algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Algorithm key that was trained
    pub algo: String,
    /// Where the fitted artifact was persisted
    pub model_path: PathBuf,
    /// Per-class precision/recall/F1 text report on the held-out partition
    pub report: String,
    pub trained_at: DateTime<Utc>,
}

// ============================================================================
// TRAIN/TEST SPLIT
// ============================================================================

/// Seeded 75/25 split, stratified by label when more than one class is
/// present. Every class keeps at least one member in the train partition;
/// singleton classes are not held out at all.
fn train_test_split(dataset: &Dataset) -> (Array2<f32>, Vec<i32>, Array2<f32>, Vec<i32>) {
    let n = dataset.n_rows();
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);

    let mut classes: Vec<i32> = dataset.y.clone();
    classes.sort_unstable();
    classes.dedup();

    let mut test_rows: Vec<usize> = Vec::new();
    if classes.len() > 1 {
        for &class in &classes {
            let mut members: Vec<usize> = (0..n).filter(|&i| dataset.y[i] == class).collect();
            members.shuffle(&mut rng);
            // Singleton classes stay in the train partition so the model
            // sees every label at least once
            let take = if members.len() < 2 {
                0
            } else {
                ((members.len() as f64 * TEST_FRACTION).round() as usize)
                    .clamp(1, members.len() - 1)
            };
            test_rows.extend(members.into_iter().take(take));
        }
    } else {
        let mut all: Vec<usize> = (0..n).collect();
        all.shuffle(&mut rng);
        let take = ((n as f64 * TEST_FRACTION).round() as usize).max(1).min(n);
        test_rows.extend(all.into_iter().take(take));
    }
    test_rows.sort_unstable();

    let mut is_test = vec![false; n];
    for &i in &test_rows {
        is_test[i] = true;
    }
    let train_rows: Vec<usize> = (0..n).filter(|&i| !is_test[i]).collect();

    let x_train = dataset.x.select(Axis(0), &train_rows);
    let x_test = dataset.x.select(Axis(0), &test_rows);
    let y_train: Vec<i32> = train_rows.iter().map(|&i| dataset.y[i]).collect();
    let y_test: Vec<i32> = test_rows.iter().map(|&i| dataset.y[i]).collect();

    (x_train, y_train, x_test, y_test)
}

// ============================================================================
// TRAINING
// ============================================================================

fn argmax(probs: &[f32]) -> usize {
    let mut best = 0;
    for (i, &p) in probs.iter().enumerate() {
        if p > probs[best] {
            best = i;
        }
    }
    best
}

fn train_one(
    registry: &Registry,
    dataset: &Dataset,
    algo: Algorithm,
) -> CoreResult<TrainingReport> {
    let (x_train, y_train, x_test, y_test) = train_test_split(dataset);
    log::info!(
        "training {} on {} rows ({} held out)",
        algo.key(),
        y_train.len(),
        y_test.len()
    );

    let mut model = ClassifierModel::untrained(algo);
    model.fit(x_train.view(), &y_train)?;

    // Evaluate on the held-out partition
    let classes: Vec<i32> = model.classes().to_vec();
    let mut y_pred = Vec::with_capacity(y_test.len());
    for row in x_test.outer_iter() {
        let row: Vec<f32> = row.iter().copied().collect();
        let probs = model.predict_proba(&row)?;
        y_pred.push(classes[argmax(&probs)]);
    }
    let report = classification_report(&y_test, &y_pred, &classes);

    let model_path = registry.persist(algo, &model)?;

    Ok(TrainingReport {
        algo: algo.key().to_string(),
        model_path,
        report,
        trained_at: Utc::now(),
    })
}

/// Train one algorithm (or every known one) from the given source.
///
/// Unknown keys fail with `UnknownAlgorithm` when `train_all` is false;
/// `None` trains the default algorithm.
pub fn train(
    registry: &Registry,
    source: &DatasetSource,
    algo: Option<&str>,
    train_all: bool,
) -> CoreResult<Vec<TrainingReport>> {
    let dataset = source.load()?;
    log::info!(
        "dataset ready: {} rows x {} features",
        dataset.n_rows(),
        dataset.n_features()
    );

    let mut reports = Vec::new();
    if train_all {
        for algo in Algorithm::ALL {
            reports.push(train_one(registry, &dataset, algo)?);
        }
        return Ok(reports);
    }

    let algo = match algo {
        Some(key) => Algorithm::from_key(key)?, // strict on the training path
        None => Algorithm::DEFAULT,
    };
    reports.push(train_one(registry, &dataset, algo)?);
    Ok(reports)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::model::registry::RegistryConfig;
    use crate::model::{predict, ArtifactSource};
    use crate::features::FeatureVector;
    use std::fs;
    use tempfile::TempDir;

    fn temp_registry() -> (TempDir, Registry) {
        let dir = TempDir::new().unwrap();
        let registry = Registry::new(RegistryConfig {
            model_dir: dir.path().join("models"),
        });
        (dir, registry)
    }

    /// Deterministic binary CSV: label follows the first feature
    fn write_separable_csv(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("train.csv");
        let mut content = String::from("f0,f1,label\n");
        for i in 0..40 {
            let jitter = i as f32 * 0.001;
            content.push_str(&format!("{},{},0\n", 0.1 + jitter, 0.2 - jitter));
            content.push_str(&format!("{},{},1\n", 0.9 - jitter, 0.8 + jitter));
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_unknown_algo_is_hard_error() {
        let (dir, registry) = temp_registry();
        let csv = write_separable_csv(&dir);
        let err = train(&registry, &DatasetSource::Csv(csv), Some("bogus"), false).unwrap_err();
        assert!(matches!(err, CoreError::UnknownAlgorithm { .. }));
    }

    #[test]
    fn test_train_single_algo_persists_artifact() {
        let (dir, registry) = temp_registry();
        let csv = write_separable_csv(&dir);

        let reports = train(&registry, &DatasetSource::Csv(csv), Some("dt"), false).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].algo, "dt");
        assert!(reports[0].model_path.exists());
        assert!(reports[0].report.contains("precision"));
    }

    #[test]
    fn test_train_all_produces_one_report_per_algorithm() {
        let (dir, registry) = temp_registry();
        let csv = write_separable_csv(&dir);

        let reports = train(&registry, &DatasetSource::Csv(csv), None, true).unwrap();
        assert_eq!(reports.len(), Algorithm::ALL.len());
        for (report, algo) in reports.iter().zip(Algorithm::ALL) {
            assert_eq!(report.algo, algo.key());
            assert!(report.model_path.exists());
        }
    }

    #[test]
    fn test_round_trip_train_then_predict() {
        let (dir, registry) = temp_registry();
        let csv = write_separable_csv(&dir);
        train(&registry, &DatasetSource::Csv(csv), Some("rf"), false).unwrap();

        // A vector matching the class-1 training pattern must land on the
        // malicious side of the 0.5 boundary, and vice versa.
        let hot = FeatureVector::from_values(vec![0.9, 0.8]);
        let cold = FeatureVector::from_values(vec![0.1, 0.2]);

        let hot_result = predict(&registry, &hot, Some("rf")).unwrap();
        let cold_result = predict(&registry, &cold, Some("rf")).unwrap();

        assert_eq!(hot_result.provenance.source, "file");
        assert!(hot_result.malicious_probability > 0.5);
        assert!(cold_result.malicious_probability < 0.5);
    }

    #[test]
    fn test_missing_sample_dirs_use_synthetic_dataset() {
        let (dir, registry) = temp_registry();
        let source = DatasetSource::Samples {
            benign_dir: dir.path().join("none_benign"),
            malware_dir: dir.path().join("none_malware"),
        };

        let reports = train(&registry, &source, Some("nb"), false).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].model_path.exists());
    }

    #[test]
    fn test_retrain_overwrites_in_place() {
        let (dir, registry) = temp_registry();
        let csv = write_separable_csv(&dir);
        let first = train(&registry, &DatasetSource::Csv(csv.clone()), Some("dt"), false).unwrap();
        let second = train(&registry, &DatasetSource::Csv(csv), Some("dt"), false).unwrap();
        assert_eq!(first[0].model_path, second[0].model_path);

        let resolved = registry.resolve(Some("dt")).unwrap();
        assert!(matches!(resolved.source, ArtifactSource::File { .. }));
    }

    #[test]
    fn test_label_only_csv_is_invalid_dataset_error() {
        // Parseable CSV with a label column but zero feature columns must
        // surface as a typed error, not a panic inside fit
        let (dir, registry) = temp_registry();
        let path = dir.path().join("labels_only.csv");
        fs::write(&path, "label\n0\n1\n").unwrap();

        for algo in ["rf", "dt", "svm", "nb", "mlp"] {
            let err =
                train(&registry, &DatasetSource::Csv(path.clone()), Some(algo), false).unwrap_err();
            assert!(matches!(err, CoreError::InvalidDataset(_)), "{}", algo);
        }
    }

    #[test]
    fn test_singleton_class_stays_in_train_partition() {
        let mut rows: Vec<Vec<f32>> = (0..9).map(|i| vec![i as f32 * 0.1]).collect();
        let mut labels = vec![0i32; 9];
        rows.push(vec![5.0]);
        labels.push(1);
        let ds = Dataset::from_rows(rows, labels).unwrap();

        let (_, y_train, _, y_test) = train_test_split(&ds);
        assert!(y_train.contains(&1), "singleton label must be trainable");
        assert!(!y_test.contains(&1));
        assert_eq!(y_train.len() + y_test.len(), 10);
        assert!(!y_test.is_empty());
    }

    #[test]
    fn test_all_singleton_classes_leave_train_nonempty() {
        let rows: Vec<Vec<f32>> = (0..3).map(|i| vec![i as f32]).collect();
        let ds = Dataset::from_rows(rows, vec![0, 1, 2]).unwrap();

        let (_, y_train, _, y_test) = train_test_split(&ds);
        assert_eq!(y_train.len(), 3);
        assert!(y_test.is_empty());
    }

    #[test]
    fn test_split_is_stratified() {
        let rows: Vec<Vec<f32>> = (0..40).map(|i| vec![i as f32]).collect();
        let labels: Vec<i32> = (0..40).map(|i| (i % 2) as i32).collect();
        let ds = Dataset::from_rows(rows, labels).unwrap();

        let (_, y_train, _, y_test) = train_test_split(&ds);
        assert_eq!(y_test.len(), 10);
        assert_eq!(y_train.len(), 30);
        assert_eq!(y_test.iter().filter(|&&l| l == 0).count(), 5);
        assert_eq!(y_test.iter().filter(|&&l| l == 1).count(), 5);
    }
}
