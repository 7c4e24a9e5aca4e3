//! Classifier Registry - artifact resolution and persistence.
//!
//! Maps an algorithm key to its canonical artifact file under an explicit
//! model directory. A missing artifact never fails resolution: the registry
//! synthesizes an untrained model of the requested kind instead, and the
//! `source` on the result says which path was taken. A present-but-corrupt
//! artifact IS a hard failure.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{self, MODEL_VERSION_TAG};
use crate::error::{CoreError, CoreResult};

use super::{Algorithm, ClassifierModel};

/// Legacy single-model filename from before per-algorithm artifacts
const LEGACY_FILENAME: &str = "model.json";

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Explicit registry configuration, so tests and embedders can point the
/// registry at an isolated directory instead of shared global state.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub model_dir: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            model_dir: constants::get_model_dir(),
        }
    }
}

// ============================================================================
// PERSISTED ARTIFACT FORMAT
// ============================================================================

/// On-disk artifact envelope
#[derive(Debug, Serialize, Deserialize)]
struct StoredArtifact {
    version: String,
    algo: String,
    trained_at: DateTime<Utc>,
    model: ClassifierModel,
}

// ============================================================================
// RESOLUTION RESULT
// ============================================================================

/// Where a resolved model came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Deserialized from a persisted, previously-trained artifact
    File { path: PathBuf },
    /// Synthesized untrained instance; predictions have no validity
    Fallback,
}

impl ArtifactSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactSource::File { .. } => "file",
            ArtifactSource::Fallback => "fallback",
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ArtifactSource::File { path } => Some(path),
            ArtifactSource::Fallback => None,
        }
    }
}

/// A model plus the provenance of how it was obtained
#[derive(Debug)]
pub struct ResolvedArtifact {
    pub model: ClassifierModel,
    pub algo: Algorithm,
    pub source: ArtifactSource,
}

// ============================================================================
// REGISTRY
// ============================================================================

pub struct Registry {
    config: RegistryConfig,
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Self {
        Self { config }
    }

    /// Registry over the default (env/per-user) model directory
    pub fn with_default_dir() -> Self {
        Self::new(RegistryConfig::default())
    }

    pub fn model_dir(&self) -> &Path {
        &self.config.model_dir
    }

    /// Canonical artifact path for an algorithm
    pub fn artifact_path(&self, algo: Algorithm) -> PathBuf {
        self.config.model_dir.join(algo.artifact_filename())
    }

    /// Resolve an optional algorithm key to a usable model.
    ///
    /// Unknown keys map to the default algorithm; `None` prefers the default
    /// artifact and falls back to the legacy single-model file. Only a
    /// present-but-unreadable artifact returns an error.
    pub fn resolve(&self, key: Option<&str>) -> CoreResult<ResolvedArtifact> {
        let (algo, path) = match key {
            Some(key) => {
                let algo = Algorithm::from_key_lenient(key);
                (algo, self.artifact_path(algo))
            }
            None => {
                let default_path = self.artifact_path(Algorithm::DEFAULT);
                if default_path.exists() {
                    (Algorithm::DEFAULT, default_path)
                } else {
                    (Algorithm::DEFAULT, self.config.model_dir.join(LEGACY_FILENAME))
                }
            }
        };

        if path.exists() {
            let stored = load_artifact(&path)?;
            log::debug!("loaded {} artifact from {}", stored.algo, path.display());
            Ok(ResolvedArtifact {
                model: stored.model,
                algo,
                source: ArtifactSource::File { path },
            })
        } else {
            log::debug!(
                "no artifact at {}, synthesizing untrained {} model",
                path.display(),
                algo.key()
            );
            Ok(ResolvedArtifact {
                model: ClassifierModel::untrained(algo),
                algo,
                source: ArtifactSource::Fallback,
            })
        }
    }

    /// Persist a trained model to its canonical location, overwriting any
    /// prior artifact for the same algorithm.
    pub fn persist(&self, algo: Algorithm, model: &ClassifierModel) -> CoreResult<PathBuf> {
        fs::create_dir_all(&self.config.model_dir)?;
        let path = self.artifact_path(algo);

        let stored = StoredArtifact {
            version: MODEL_VERSION_TAG.to_string(),
            algo: algo.key().to_string(),
            trained_at: Utc::now(),
            model: model.clone(),
        };
        let json = serde_json::to_vec(&stored).map_err(|e| CoreError::ArtifactLoad {
            path: path.clone(),
            reason: format!("serialization failed: {}", e),
        })?;
        fs::write(&path, json)?;

        log::info!("persisted {} artifact to {}", algo.key(), path.display());
        Ok(path)
    }
}

fn load_artifact(path: &Path) -> CoreResult<StoredArtifact> {
    let data = fs::read(path).map_err(|e| CoreError::ArtifactLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_slice(&data).map_err(|e| CoreError::ArtifactLoad {
        path: path.to_path_buf(),
        reason: format!("decode failed: {}", e),
    })
}

// ============================================================================
// TESTS
// ============================================================================
