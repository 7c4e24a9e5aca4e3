//! Directory-pair dataset construction.
//!
//! Walks a benign directory and a malware directory recursively, extracts
//! features from every readable file, and labels rows by directory of
//! origin. Unreadable files are skipped, not fatal - messy corpora are the
//! normal case. If neither directory yields a single row, a small synthetic
//! dataset keeps the training path runnable; it is a demo aid, not data.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use walkdir::WalkDir;

use crate::constants::RANDOM_SEED;
use crate::error::CoreResult;
use crate::features::{extract, FeatureVector, FEATURE_COUNT};

use super::Dataset;

/// Rows in the synthetic fallback dataset
const SYNTHETIC_ROWS: usize = 200;

/// Benign label
pub const LABEL_BENIGN: i32 = 0;
/// Malware label
pub const LABEL_MALWARE: i32 = 1;

/// Walk one labeled directory, extracting a vector per readable file.
fn collect_dir(dir: &Path, label: i32, out: &mut Vec<(FeatureVector, i32)>) {
    if !dir.is_dir() {
        log::warn!("sample directory {} does not exist, skipping", dir.display());
        return;
    }

    for entry in WalkDir::new(dir).follow_links(false).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        match fs::read(entry.path()) {
            Ok(bytes) => out.push((extract(&bytes), label)),
            Err(e) => {
                // Skip unreadable files, keep walking
                log::warn!("skipping {}: {}", entry.path().display(), e);
            }
        }
    }
}

/// Collect labeled feature vectors from a benign/malware directory pair.
pub fn collect(benign_dir: &Path, malware_dir: &Path) -> Vec<(FeatureVector, i32)> {
    let mut rows = Vec::new();
    collect_dir(benign_dir, LABEL_BENIGN, &mut rows);
    collect_dir(malware_dir, LABEL_MALWARE, &mut rows);
    log::info!(
        "collected {} sample vectors from {} and {}",
        rows.len(),
        benign_dir.display(),
        malware_dir.display()
    );
    rows
}

/// Build a training dataset from the directory pair, with the synthetic
/// fallback when the walk produces nothing.
pub fn load_dataset(benign_dir: &Path, malware_dir: &Path) -> CoreResult<Dataset> {
    let collected = collect(benign_dir, malware_dir);
    if collected.is_empty() {
        log::warn!("no sample files found, generating a synthetic demo dataset");
        return synthetic_dataset();
    }

    let mut rows = Vec::with_capacity(collected.len());
    let mut labels = Vec::with_capacity(collected.len());
    for (vector, label) in collected {
        rows.push(vector.as_slice().to_vec());
        labels.push(label);
    }
    Dataset::from_rows(rows, labels)
}

/// 200 random rows; label = linear-threshold rule over the first two
/// feature dimensions (x0 + 0.5*x1 > 0.75).
pub fn synthetic_dataset() -> CoreResult<Dataset> {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
    let mut rows = Vec::with_capacity(SYNTHETIC_ROWS);
    let mut labels = Vec::with_capacity(SYNTHETIC_ROWS);

    for _ in 0..SYNTHETIC_ROWS {
        let row: Vec<f32> = (0..FEATURE_COUNT).map(|_| rng.gen::<f32>()).collect();
        let label = if row[0] + row[1] * 0.5 > 0.75 {
            LABEL_MALWARE
        } else {
            LABEL_BENIGN
        };
        rows.push(row);
        labels.push(label);
    }

    Dataset::from_rows(rows, labels)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_labels_by_directory() {
        let benign = TempDir::new().unwrap();
        let malware = TempDir::new().unwrap();
        fs::write(benign.path().join("doc.txt"), b"plain harmless text").unwrap();
        fs::write(benign.path().join("doc2.txt"), b"more harmless text").unwrap();
        fs::write(malware.path().join("evil.bin"), vec![0x90u8; 128]).unwrap();

        let rows = collect(benign.path(), malware.path());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.iter().filter(|(_, l)| *l == LABEL_BENIGN).count(), 2);
        assert_eq!(rows.iter().filter(|(_, l)| *l == LABEL_MALWARE).count(), 1);
    }

    #[test]
    fn test_collect_recurses_into_subdirectories() {
        let benign = TempDir::new().unwrap();
        let nested = benign.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.txt"), b"nested sample file").unwrap();
        let malware = TempDir::new().unwrap();

        let rows = collect(benign.path(), malware.path());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, LABEL_BENIGN);
    }

    #[test]
    fn test_missing_directories_fall_back_to_synthetic() {
        let root = TempDir::new().unwrap();
        let ds = load_dataset(
            &root.path().join("no_benign"),
            &root.path().join("no_malware"),
        )
        .unwrap();

        assert_eq!(ds.n_rows(), SYNTHETIC_ROWS);
        assert_eq!(ds.n_features(), FEATURE_COUNT);
        // Both classes must appear for training to be meaningful
        assert!(ds.y.contains(&LABEL_BENIGN));
        assert!(ds.y.contains(&LABEL_MALWARE));
    }

    #[test]
    fn test_synthetic_dataset_is_deterministic() {
        let a = synthetic_dataset().unwrap();
        let b = synthetic_dataset().unwrap();
        assert_eq!(a.y, b.y);
        assert_eq!(a.x, b.x);
    }

    #[test]
    fn test_synthetic_labels_follow_threshold_rule() {
        let ds = synthetic_dataset().unwrap();
        for (row, &label) in ds.x.outer_iter().zip(&ds.y) {
            let expected = if row[0] + row[1] * 0.5 > 0.75 {
                LABEL_MALWARE
            } else {
                LABEL_BENIGN
            };
            assert_eq!(label, expected);
        }
    }
}
