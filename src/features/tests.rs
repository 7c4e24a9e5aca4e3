//! Integration tests for the extraction pipeline as a whole.

#[cfg(test)]
mod integration_tests {
    use crate::features::{extract, layout, FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};

    /// Extract a realistic mixed input and check every region of the vector
    #[test]
    fn test_full_vector_regions() {
        let mut input = Vec::new();
        // A header-ish printable run
        input.extend_from_slice(b"MZ This program cannot be run in DOS mode");
        // Some binary padding
        input.extend_from_slice(&[0u8; 512]);
        // High-entropy tail
        input.extend((0..=255u8).cycle().take(256));

        let v = extract(&input);
        assert_eq!(v.as_slice().len(), FEATURE_COUNT);
        assert!(v.is_compatible());

        // Histogram region is a probability distribution
        let sum: f32 = v.as_slice()[..256].iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(v.as_slice()[..256].iter().all(|&p| (0.0..=1.0).contains(&p)));

        // Entropy in range, strings present, size matches
        let entropy = v.get_by_name("entropy").unwrap();
        assert!(entropy > 0.0 && entropy <= 8.0);
        assert!(v.get_by_name("strings_count").unwrap() >= 1.0);
        assert_eq!(v.get_by_name("file_size"), Some(input.len() as f32));
    }

    /// Names and values must stay index-aligned
    #[test]
    fn test_names_parallel_to_values() {
        let v = extract(b"alignment check");
        assert_eq!(v.feature_names().len(), v.as_slice().len());
        assert_eq!(FEATURE_LAYOUT[256], "entropy");
        assert_eq!(
            v.get(256),
            v.get_by_name("entropy"),
            "name lookup must hit the same slot as the fixed offset"
        );
    }

    /// A vector serialized by one component is readable by another
    #[test]
    fn test_vector_survives_json_boundary() {
        let v = extract(&[7u8; 100]);
        let json = serde_json::to_string(&v).unwrap();
        let back: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_slice(), v.as_slice());
        assert_eq!(back.layout_hash, layout::layout_hash());
    }
}
