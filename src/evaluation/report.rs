//! Evaluation report types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Precision, recall and F1 for one class label, with its support.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true rows with this label.
    pub support: usize,
}

impl ClassMetrics {
    /// Metrics from confusion counts. Every zero division yields 0.0.
    pub fn from_counts(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

        let precision = ratio(true_positives, true_positives + false_positives);
        let recall = ratio(true_positives, true_positives + false_negatives);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        ClassMetrics {
            precision,
            recall,
            f1,
            support: true_positives + false_negatives,
        }
    }
}

/// Classification report for one category column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub name: String,
    /// Metrics for label 0 and label 1.
    pub classes: [ClassMetrics; 2],
    /// Fraction of rows predicted correctly.
    pub accuracy: f64,
    /// Unweighted mean over the two labels.
    pub macro_avg: ClassMetrics,
    /// Support-weighted mean over the two labels.
    pub weighted_avg: ClassMetrics,
}

impl CategoryReport {
    /// Metrics for label 1.
    pub fn positive(&self) -> &ClassMetrics {
        &self.classes[1]
    }

    /// Metrics for label 0.
    pub fn negative(&self) -> &ClassMetrics {
        &self.classes[0]
    }
}

/// Per-category reports plus aggregate accuracies over a test set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub categories: Vec<CategoryReport>,
    /// Mean over every (message, category) cell of predicted == actual.
    pub accuracy: f64,
    /// Fraction of messages whose whole label vector is correct.
    pub subset_accuracy: f64,
    pub n_samples: usize,
}

impl Report {
    /// Look up a category's report by name.
    pub fn category(&self, name: &str) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Mean of the per-category macro F1 scores.
    pub fn macro_f1(&self) -> f64 {
        if self.categories.is_empty() {
            return 0.0;
        }
        self.categories.iter().map(|c| c.macro_avg.f1).sum::<f64>() / self.categories.len() as f64
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, label: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{label:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
        m.precision, m.recall, m.f1, m.support
    )
}

impl fmt::Display for CategoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        write_row(f, "0", &self.classes[0])?;
        write_row(f, "1", &self.classes[1])?;
        let total = self.classes[0].support + self.classes[1].support;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, total
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for category in &self.categories {
            writeln!(f, "{category}")?;
        }
        writeln!(f, "Model accuracy: {:.3}%", self.accuracy * 100.0)?;
        write!(f, "Subset accuracy: {:.3}%", self.subset_accuracy * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_from_counts() {
        let m = ClassMetrics::from_counts(2, 2, 0);
        assert_eq!(m.precision, 0.5);
        assert_eq!(m.recall, 1.0);
        assert!((m.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(m.support, 2);
    }

    #[test]
    fn test_zero_division() {
        let m = ClassMetrics::from_counts(0, 0, 0);
        assert_eq!(m, ClassMetrics::default());
    }
}
