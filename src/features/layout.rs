//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Downstream code reads specific offsets (the histogram bins, the entropy
//! slot, ...) and persisted artifacts were trained against one exact layout,
//! so the order below is a frozen contract.

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Number of byte-value histogram bins (one per possible byte value)
pub const BYTE_HISTOGRAM_BINS: usize = 256;

/// Trailing scalar features appended after the histogram, in vector order
pub const SCALAR_FEATURES: &[&str] = &[
    "entropy",          // 256: Shannon entropy of the whole file, bits
    "strings_mean_len", // 257: mean printable-string length
    "strings_std_len",  // 258: population std of printable-string lengths
    "strings_count",    // 259: number of printable strings
    "file_size",        // 260: raw byte length
];

/// Total number of features
pub const FEATURE_COUNT: usize = BYTE_HISTOGRAM_BINS + 5;

/// Feature names in the exact order they appear in the vector:
/// `byte_hist_0` .. `byte_hist_255`, then the scalar features.
/// This is the SINGLE SOURCE OF TRUTH for feature layout.
pub static FEATURE_LAYOUT: Lazy<Vec<String>> = Lazy::new(|| {
    let mut names = Vec::with_capacity(FEATURE_COUNT);
    for i in 0..BYTE_HISTOGRAM_BINS {
        names.push(format!("byte_hist_{}", i));
    }
    for name in SCALAR_FEATURES {
        names.push((*name).to_string());
    }
    names
});

// ============================================================================
// LAYOUT HASH
// ============================================================================

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

/// Compute CRC32 hash of the feature layout
/// Used to detect layout mismatches at runtime
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    // Include version in hash
    hasher.update(&[FEATURE_VERSION]);

    // Hash all feature names in order
    for name in FEATURE_LAYOUT.iter() {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash (cached)
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.clone(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version,
            self.expected_hash,
            self.actual_version,
            self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).map(|s| s.as_str())
}

// ============================================================================
// TESTS
// ============================================================================
