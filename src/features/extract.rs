//! Feature extraction - deterministic transform from raw bytes to a vector.
//!
//! Each input file (as a byte slice) maps to exactly [`FEATURE_COUNT`] f32
//! values:
//! - 256 byte-value histogram bins, normalized to a probability distribution
//! - Shannon entropy of the whole input (bits, 0..=8)
//! - Printable-string statistics (mean length, population std, count)
//! - File size in bytes
//!
//! Pure function of the input bytes: no I/O, no state, never fails. Empty
//! input yields an all-zero vector (aside from file_size = 0, which is zero
//! anyway).

use super::layout::BYTE_HISTOGRAM_BINS;
use super::vector::FeatureVector;

/// Minimum run length for a printable-ASCII run to count as a "string"
const MIN_STRING_LEN: usize = 4;

/// Count occurrences of each byte value across the whole input.
fn byte_counts(bytes: &[u8]) -> [u64; BYTE_HISTOGRAM_BINS] {
    let mut counts = [0u64; BYTE_HISTOGRAM_BINS];
    for &b in bytes {
        counts[b as usize] += 1;
    }
    counts
}

/// Normalized byte histogram: each bin is the probability of that byte value.
/// Empty input → all zeros (no division by zero).
fn byte_histogram(counts: &[u64; BYTE_HISTOGRAM_BINS], total: usize) -> [f64; BYTE_HISTOGRAM_BINS] {
    let mut hist = [0.0f64; BYTE_HISTOGRAM_BINS];
    if total == 0 {
        return hist;
    }
    let total = total as f64;
    for (h, &c) in hist.iter_mut().zip(counts.iter()) {
        *h = c as f64 / total;
    }
    hist
}

/// Shannon entropy in bits over strictly positive bins.
/// Empty input → 0.0. Range is [0, 8] for byte-valued input.
fn shannon_entropy(hist: &[f64; BYTE_HISTOGRAM_BINS]) -> f64 {
    let mut entropy = 0.0;
    for &p in hist.iter() {
        if p > 0.0 {
            entropy -= p * p.log2();
        }
    }
    entropy
}

/// Printable-string statistics: (mean length, population std, count).
///
/// A "string" is a maximal run of printable ASCII (0x20 space through 0x7E
/// tilde) of at least [`MIN_STRING_LEN`] bytes. No qualifying runs → zeros,
/// including the case where the whole input is printable but shorter than
/// the minimum.
fn string_stats(bytes: &[u8]) -> (f64, f64, f64) {
    let mut lengths: Vec<usize> = Vec::new();
    let mut run = 0usize;

    for &b in bytes {
        if (0x20..=0x7e).contains(&b) {
            run += 1;
        } else {
            if run >= MIN_STRING_LEN {
                lengths.push(run);
            }
            run = 0;
        }
    }
    if run >= MIN_STRING_LEN {
        lengths.push(run);
    }

    if lengths.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let count = lengths.len() as f64;
    let mean = lengths.iter().map(|&l| l as f64).sum::<f64>() / count;
    // Population std (divisor = count, not count - 1)
    let variance = lengths
        .iter()
        .map(|&l| {
            let d = l as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / count;

    (mean, variance.sqrt(), count)
}

/// Extract the full feature vector from raw file bytes.
///
/// Layout (see `layout.rs`): 256 histogram bins, then entropy, string mean
/// length, string length std, string count, file size. Deterministic and
/// total - identical bytes always yield a bit-identical vector.
pub fn extract(bytes: &[u8]) -> FeatureVector {
    let counts = byte_counts(bytes);
    let hist = byte_histogram(&counts, bytes.len());
    let entropy = shannon_entropy(&hist);
    let (mean_len, std_len, num_strings) = string_stats(bytes);

    let mut values = Vec::with_capacity(BYTE_HISTOGRAM_BINS + 5);
    values.extend(hist.iter().map(|&p| p as f32));
    values.push(entropy as f32);
    values.push(mean_len as f32);
    values.push(std_len as f32);
    values.push(num_strings as f32);
    values.push(bytes.len() as f32);

    FeatureVector::from_values(values)
}

// ============================================================================
// TESTS
// ============================================================================
