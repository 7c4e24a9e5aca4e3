//! Feature CSV ingestion and export.
//!
//! Contract: header row holds feature names plus a `label` column of 0/1
//! integers; every other column is a numeric feature. The values this crate
//! writes are plain numbers, so no quoting or escaping is involved.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::features::{FeatureVector, FEATURE_LAYOUT};

use super::Dataset;

/// Load a training dataset from a feature CSV.
/// A missing `label` column is a schema error, not a fallback case.
pub fn load_csv(path: &Path) -> CoreResult<Dataset> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines().enumerate();

    let (_, header) = lines
        .next()
        .ok_or_else(|| CoreError::InvalidDataset("empty CSV file".to_string()))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let label_col = columns
        .iter()
        .position(|&c| c == "label")
        .ok_or_else(|| {
            CoreError::InvalidDataset("CSV must include a 'label' column with 0/1 labels".to_string())
        })?;

    let mut rows = Vec::new();
    let mut labels = Vec::new();

    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != columns.len() {
            return Err(CoreError::InvalidDataset(format!(
                "line {}: {} fields, header has {}",
                line_no + 1,
                fields.len(),
                columns.len()
            )));
        }

        let mut row = Vec::with_capacity(columns.len() - 1);
        let mut label = 0i32;
        for (i, field) in fields.iter().enumerate() {
            let value: f32 = field.parse().map_err(|_| {
                CoreError::InvalidDataset(format!(
                    "line {}: '{}' is not numeric",
                    line_no + 1,
                    field
                ))
            })?;
            if i == label_col {
                label = value as i32;
            } else {
                row.push(value);
            }
        }
        rows.push(row);
        labels.push(label);
    }

    Dataset::from_rows(rows, labels)
}

/// Write labeled feature vectors as a CSV with the canonical header:
/// the full feature layout plus a trailing `label` column.
pub fn write_features(path: &Path, rows: &[(FeatureVector, i32)]) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    let mut header: Vec<&str> = FEATURE_LAYOUT.iter().map(String::as_str).collect();
    header.push("label");
    writeln!(out, "{}", header.join(","))?;

    for (vector, label) in rows {
        let mut line = String::new();
        for value in vector.as_slice() {
            line.push_str(&format!("{}", value));
            line.push(',');
        }
        line.push_str(&label.to_string());
        writeln!(out, "{}", line)?;
    }

    out.flush()?;
    log::info!("wrote {} labeled rows to {}", rows.len(), path.display());
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{extract, FEATURE_COUNT};
    use tempfile::TempDir;

    #[test]
    fn test_load_simple_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "f0,f1,label\n0.5,1.5,0\n2.5,3.5,1\n").unwrap();

        let ds = load_csv(&path).unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.y, vec![0, 1]);
        assert_eq!(ds.x[[0, 1]], 1.5);
    }

    #[test]
    fn test_label_column_position_is_flexible() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "label,f0\n1,9.0\n0,4.0\n").unwrap();

        let ds = load_csv(&path).unwrap();
        assert_eq!(ds.y, vec![1, 0]);
        assert_eq!(ds.x[[0, 0]], 9.0);
    }

    #[test]
    fn test_missing_label_column_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "f0,f1\n0.5,1.5\n").unwrap();

        let err = load_csv(&path).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDataset(_)));
    }

    #[test]
    fn test_non_numeric_field_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "f0,label\nabc,0\n").unwrap();
        assert!(load_csv(&path).is_err());
    }

    #[test]
    fn test_write_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("features.csv");

        let rows = vec![
            (extract(b"benign looking text content here"), 0),
            (extract(&[0xffu8; 64]), 1),
        ];
        write_features(&path, &rows).unwrap();

        let ds = load_csv(&path).unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.n_features(), FEATURE_COUNT);
        assert_eq!(ds.y, vec![0, 1]);
        // Spot-check a value survived the text round trip
        let expected = rows[0].0.get_by_name("file_size").unwrap();
        assert_eq!(ds.x[[0, FEATURE_COUNT - 1]], expected);
    }
}
