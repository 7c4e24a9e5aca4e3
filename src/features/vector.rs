//! Feature Vector - Core data structure for ML input
//!
//! **Versioned feature vector with layout validation**
//!
//! Uses centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Layout hash for compatibility checks

use serde::{Deserialize, Serialize};

use super::layout::{
    feature_index, layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT,
    FEATURE_LAYOUT, FEATURE_VERSION,
};

/// Versioned feature vector, immutable once produced by extraction.
///
/// `values` always holds exactly [`FEATURE_COUNT`] entries in the order
/// defined by `FEATURE_LAYOUT`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    values: Vec<f32>,
}

impl FeatureVector {
    /// Create a new zeroed feature vector with current version
    pub fn new() -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: vec![0.0; FEATURE_COUNT],
        }
    }

    /// Create from raw values with current version.
    /// Truncates or zero-pads to FEATURE_COUNT if the length is wrong.
    pub fn from_values(values: Vec<f32>) -> Self {
        let mut values = values;
        values.resize(FEATURE_COUNT, 0.0);
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        feature_index(name).and_then(|i| self.get(i))
    }

    pub(crate) fn set(&mut self, index: usize, value: f32) {
        if index < FEATURE_COUNT {
            self.values[index] = value;
        }
    }

    /// Validate that this vector is compatible with current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// Check if this vector is compatible with current layout
    pub fn is_compatible(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get feature names for this vector
    pub fn feature_names(&self) -> &'static [String] {
        FEATURE_LAYOUT.as_slice()
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values,
        })
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_new() {
        let vector = FeatureVector::new();
        assert_eq!(vector.version, FEATURE_VERSION);
        assert_eq!(vector.layout_hash, layout_hash());
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_feature_vector_from_short_vec_pads() {
        let vector = FeatureVector::from_values(vec![1.0, 2.0]);
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
        assert_eq!(vector.get(0), Some(1.0));
        assert_eq!(vector.get(2), Some(0.0));
    }

    #[test]
    fn test_feature_vector_get_by_name() {
        let mut vector = FeatureVector::new();
        vector.set(256, 7.5);
        assert_eq!(vector.get_by_name("entropy"), Some(7.5));
        assert_eq!(vector.get_by_name("nonexistent"), None);
    }

    #[test]
    fn test_feature_vector_validation() {
        let vector = FeatureVector::new();
        assert!(vector.is_compatible());
        assert!(vector.validate().is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut vector = FeatureVector::new();
        vector.set(0, 0.25);
        vector.set(260, 4096.0);

        let json = serde_json::to_string(&vector).unwrap();
        let back: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vector);
        assert!(back.is_compatible());
    }

    #[test]
    fn test_to_log_entry() {
        let vector = FeatureVector::new();
        let log = vector.to_log_entry();
        assert_eq!(log["feature_version"], FEATURE_VERSION);
        assert!(log["layout_hash"].as_u64().is_some());
    }
}
