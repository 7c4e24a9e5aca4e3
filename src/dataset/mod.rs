//! Dataset Module - Training Data Ingestion
//!
//! Two sources feed the training path: a feature CSV with a `label` column,
//! or a pair of sample directories (benign, malware) whose files are pushed
//! through the feature extractor. An empty walk degrades to a small
//! synthetic dataset so the training path stays exercisable in a demo
//! setting.

pub mod csv;
pub mod samples;

use ndarray::Array2;

use crate::error::{CoreError, CoreResult};

/// In-memory training dataset: row-major feature matrix plus 0/1 labels.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: Array2<f32>,
    pub y: Vec<i32>,
}

impl Dataset {
    /// Build from parallel rows and labels; rows must share one width.
    pub fn from_rows(rows: Vec<Vec<f32>>, y: Vec<i32>) -> CoreResult<Self> {
        if rows.len() != y.len() {
            return Err(CoreError::InvalidDataset(format!(
                "{} feature rows but {} labels",
                rows.len(),
                y.len()
            )));
        }
        if rows.is_empty() {
            return Err(CoreError::InvalidDataset("no rows".to_string()));
        }

        let width = rows[0].len();
        if width == 0 {
            return Err(CoreError::InvalidDataset(
                "rows have no feature columns".to_string(),
            ));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(CoreError::InvalidDataset(format!(
                "row {} has {} values, expected {}",
                bad,
                rows[bad].len(),
                width
            )));
        }

        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        let x = Array2::from_shape_vec((y.len(), width), flat)
            .map_err(|e| CoreError::InvalidDataset(e.to_string()))?;
        Ok(Self { x, y })
    }

    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}
