//! Evaluation metrics for the training path.
//!
//! Produces a per-class precision/recall/F1/support table plus overall
//! accuracy as plain text, the shape callers expect in a TrainingReport.

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

/// Per-class metrics row
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label: i32,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Compute per-class metrics over paired true/predicted labels.
/// `classes` fixes the row order; labels outside it are ignored.
pub fn per_class_metrics(y_true: &[i32], y_pred: &[i32], classes: &[i32]) -> Vec<ClassMetrics> {
    classes
        .iter()
        .map(|&label| {
            let mut tp = 0usize;
            let mut fp = 0usize;
            let mut fn_ = 0usize;
            let mut support = 0usize;

            for (&t, &p) in y_true.iter().zip(y_pred) {
                if t == label {
                    support += 1;
                    if p == label {
                        tp += 1;
                    } else {
                        fn_ += 1;
                    }
                } else if p == label {
                    fp += 1;
                }
            }

            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + fn_);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            ClassMetrics {
                label,
                precision,
                recall,
                f1,
                support,
            }
        })
        .collect()
}

/// Fraction of exact label matches
pub fn accuracy(y_true: &[i32], y_pred: &[i32]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    hits as f64 / y_true.len() as f64
}

/// Text report with one row per class plus overall accuracy.
pub fn classification_report(y_true: &[i32], y_pred: &[i32], classes: &[i32]) -> String {
    let rows = per_class_metrics(y_true, y_pred, classes);
    let total = y_true.len();

    let mut out = String::new();
    out.push_str(&format!(
        "{:>12} {:>10} {:>10} {:>10} {:>10}\n\n",
        "", "precision", "recall", "f1-score", "support"
    ));
    for row in &rows {
        out.push_str(&format!(
            "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}\n",
            row.label, row.precision, row.recall, row.f1, row.support
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "{:>12} {:>10} {:>10} {:>10.4} {:>10}\n",
        "accuracy",
        "",
        "",
        accuracy(y_true, y_pred),
        total
    ));
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = [0, 0, 1, 1];
        let rows = per_class_metrics(&y, &y, &[0, 1]);
        for row in &rows {
            assert_eq!(row.precision, 1.0);
            assert_eq!(row.recall, 1.0);
            assert_eq!(row.f1, 1.0);
            assert_eq!(row.support, 2);
        }
        assert_eq!(accuracy(&y, &y), 1.0);
    }

    #[test]
    fn test_hand_checked_confusion() {
        // true:  0 0 0 1 1
        // pred:  0 1 0 1 0
        // class 0: tp=2 fp=1 fn=1 → precision 2/3, recall 2/3
        // class 1: tp=1 fp=1 fn=1 → precision 1/2, recall 1/2
        let y_true = [0, 0, 0, 1, 1];
        let y_pred = [0, 1, 0, 1, 0];
        let rows = per_class_metrics(&y_true, &y_pred, &[0, 1]);

        assert!((rows[0].precision - 2.0 / 3.0).abs() < 1e-9);
        assert!((rows[0].recall - 2.0 / 3.0).abs() < 1e-9);
        assert!((rows[1].precision - 0.5).abs() < 1e-9);
        assert!((rows[1].recall - 0.5).abs() < 1e-9);
        assert_eq!(rows[0].support, 3);
        assert_eq!(rows[1].support, 2);
        assert!((accuracy(&y_true, &y_pred) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_absent_predicted_class_is_zero_not_nan() {
        let y_true = [0, 1];
        let y_pred = [0, 0];
        let rows = per_class_metrics(&y_true, &y_pred, &[0, 1]);
        assert_eq!(rows[1].precision, 0.0);
        assert_eq!(rows[1].recall, 0.0);
        assert_eq!(rows[1].f1, 0.0);
    }

    #[test]
    fn test_report_mentions_each_class() {
        let y_true = [0, 1, 1, 0];
        let y_pred = [0, 1, 0, 0];
        let report = classification_report(&y_true, &y_pred, &[0, 1]);
        assert!(report.contains("precision"));
        assert!(report.contains("accuracy"));
        assert!(report.lines().count() >= 5);
    }
}
