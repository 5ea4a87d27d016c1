use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Held-out evaluation of a binary classifier. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Indexed by class label (0, 1)
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub samples: usize,
}

impl ClassificationReport {
    pub fn from_predictions(actual: &[u32], predicted: &[u32]) -> Self {
        let samples = actual.len().min(predicted.len());
        let pairs = || actual.iter().zip(predicted.iter()).take(samples);

        let correct = pairs().filter(|(a, p)| a == p).count();
        let accuracy = if samples > 0 {
            correct as f64 / samples as f64
        } else {
            0.0
        };

        let class_metrics = |class: u32| {
            let tp = pairs().filter(|(a, p)| **a == class && **p == class).count();
            let predicted_pos = pairs().filter(|(_, p)| **p == class).count();
            let support = pairs().filter(|(a, _)| **a == class).count();

            let precision = ratio(tp, predicted_pos);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                precision,
                recall,
                f1,
                support,
            }
        };

        Self {
            classes: [class_metrics(0), class_metrics(1)],
            accuracy,
            samples,
        }
    }
}

// Zero denominators report 0.0 rather than NaN.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (class, m) in self.classes.iter().enumerate() {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                class, m.precision, m.recall, m.f1, m.support
            )?;
        }
        write!(
            f,
            "{:>12} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.samples
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_metrics() {
        let actual = [1, 1, 1, 0, 0, 0, 0, 0];
        let predicted = [1, 1, 0, 1, 0, 0, 0, 0];
        let report = ClassificationReport::from_predictions(&actual, &predicted);

        let pos = report.classes[1];
        assert!((pos.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((pos.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((pos.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(pos.support, 3);

        let neg = report.classes[0];
        assert!((neg.precision - 0.8).abs() < 1e-12);
        assert!((neg.recall - 0.8).abs() < 1e-12);
        assert_eq!(neg.support, 5);

        assert!((report.accuracy - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_absent_class_reports_zero() {
        let report = ClassificationReport::from_predictions(&[0, 0], &[0, 0]);
        assert_eq!(report.classes[1].precision, 0.0);
        assert_eq!(report.classes[1].recall, 0.0);
        assert_eq!(report.classes[1].support, 0);
        assert_eq!(report.accuracy, 1.0);
        assert!(report.to_string().contains("accuracy"));
    }
}
