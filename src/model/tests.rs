//! Integration tests across the classifier family.

#[cfg(test)]
mod integration_tests {
    use crate::model::{Algorithm, Classifier, ClassifierModel};
    use ndarray::Array2;

    fn separable_dataset() -> (Array2<f32>, Vec<i32>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..25 {
            let jitter = i as f32 * 0.003;
            rows.extend_from_slice(&[0.1 + jitter, 0.2 - jitter, 0.05]);
            labels.push(0);
            rows.extend_from_slice(&[0.9 - jitter, 0.8 + jitter, 0.95]);
            labels.push(1);
        }
        (Array2::from_shape_vec((50, 3), rows).unwrap(), labels)
    }

    /// Every algorithm honors the same trait contract on the same data
    #[test]
    fn test_every_algorithm_fits_the_contract() {
        let (x, y) = separable_dataset();

        for algo in Algorithm::ALL {
            let mut model = ClassifierModel::untrained(algo);
            assert!(!model.is_trained(), "{} should start untrained", algo);
            assert!(model.classes().is_empty());

            model.fit(x.view(), &y).unwrap();
            assert!(model.is_trained(), "{} should be trained after fit", algo);
            assert_eq!(model.classes(), &[0, 1], "{}", algo);

            let probs = model.predict_proba(&[0.1, 0.2, 0.05]).unwrap();
            assert_eq!(probs.len(), 2, "{}", algo);
            let sum: f32 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-3, "{}: probs {:?}", algo, probs);
            assert!(probs[0] > 0.5, "{}: benign-side row scored {:?}", algo, probs);
        }
    }

    /// Every algorithm separates the two clusters after training
    #[test]
    fn test_every_algorithm_separates_clusters() {
        let (x, y) = separable_dataset();

        for algo in Algorithm::ALL {
            let mut model = ClassifierModel::untrained(algo);
            model.fit(x.view(), &y).unwrap();

            let p1 = model.predict_proba(&[0.9, 0.8, 0.95]).unwrap();
            assert!(
                p1[1] > 0.5,
                "{} failed to flag the class-1 cluster: {:?}",
                algo,
                p1
            );
        }
    }

    /// The tagged artifact representation survives serde for every variant
    #[test]
    fn test_every_variant_serde_round_trip() {
        let (x, y) = separable_dataset();
        let probe = [0.5f32, 0.5, 0.5];

        for algo in Algorithm::ALL {
            let mut model = ClassifierModel::untrained(algo);
            model.fit(x.view(), &y).unwrap();

            let json = serde_json::to_string(&model).unwrap();
            let back: ClassifierModel = serde_json::from_str(&json).unwrap();
            assert_eq!(back.name(), model.name());
            assert_eq!(
                back.predict_proba(&probe).unwrap(),
                model.predict_proba(&probe).unwrap(),
                "{} changed behavior across serde",
                algo
            );
        }
    }

    #[test]
    fn test_key_round_trip() {
        for algo in Algorithm::ALL {
            assert_eq!(Algorithm::from_key(algo.key()).unwrap(), algo);
        }
        assert!(Algorithm::from_key("lstm").is_err());
        assert_eq!(Algorithm::from_key_lenient("lstm"), Algorithm::Forest);
    }
}
