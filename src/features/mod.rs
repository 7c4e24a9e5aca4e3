//! Features Module - Feature Extraction Engine
//!
//! Deterministic transform from raw file bytes to a fixed-length numeric
//! vector. The layout is versioned and hash-checked so persisted artifacts
//! and exported datasets stay compatible with the code that reads them.

pub mod extract;
pub mod layout;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use extract::extract;
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::FeatureVector;
