//! Error handling
//!
//! Typed core errors. The CLI (or any other collaborator) maps these to
//! user-visible messages; the core never panics on a caller mistake.

use std::path::PathBuf;

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Dataset could not be used for training (bad schema, no rows)
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// Training was asked for an algorithm key outside the known set
    #[error("unknown algorithm '{key}', choose one of: rf, dt, svm, nb, mlp")]
    UnknownAlgorithm { key: String },

    /// A persisted artifact exists but could not be read or decoded
    #[error("failed to load model artifact {path}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    /// A fit call failed (including the degenerate one-shot fit)
    #[error("model fit failed: {0}")]
    ArtifactFit(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
