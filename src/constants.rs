//! Central Configuration Constants
//!
//! Single source of truth for configuration defaults.
//! To change the model directory or version tag, only edit this file.

use std::path::PathBuf;

/// App name, used for the per-user data directory
pub const APP_NAME: &str = "maldetect";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Static version tag reported in inference provenance
pub const MODEL_VERSION_TAG: &str = "1.0";

/// Default decision threshold for the malicious label
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Seed used for splits, bagging and weight initialization
pub const RANDOM_SEED: u64 = 42;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the model artifact directory from environment or use the default
///
/// Fallback chain: `MALDETECT_MODEL_DIR` env var, then the per-user data
/// directory, then `./models` relative to the working directory.
pub fn get_model_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MALDETECT_MODEL_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("models")
}
