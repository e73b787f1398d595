//! Computing classification reports from predictions.

use log::info;

use crate::dataset::Dataset;
use crate::error::{Result, TriageError};
use crate::evaluation::report::{CategoryReport, ClassMetrics, Report};
use crate::model::FittedPipeline;

fn check_shapes(y_true: &[Vec<u8>], y_pred: &[Vec<u8>]) -> Result<usize> {
    if y_true.len() != y_pred.len() {
        return Err(TriageError::invalid_argument(format!(
            "Expected {} prediction rows, got {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    let width = y_true.first().map(Vec::len).unwrap_or(0);
    let ragged = y_true
        .iter()
        .chain(y_pred)
        .position(|row| row.len() != width);
    if let Some(row) = ragged {
        return Err(TriageError::schema(format!(
            "Label row {} does not have {width} values",
            row % y_true.len().max(1)
        )));
    }
    Ok(width)
}

/// Mean over every (row, category) cell of `predicted == actual`.
///
/// ```
/// use relief_triage::evaluation::cell_accuracy;
///
/// let y_test = vec![vec![1, 0], vec![0, 1]];
/// let y_pred = vec![vec![1, 0], vec![1, 1]];
/// assert_eq!(cell_accuracy(&y_test, &y_pred).unwrap(), 0.75);
/// ```
pub fn cell_accuracy(y_true: &[Vec<u8>], y_pred: &[Vec<u8>]) -> Result<f64> {
    let width = check_shapes(y_true, y_pred)?;
    let cells = y_true.len() * width;
    if cells == 0 {
        return Ok(0.0);
    }
    let matches: usize = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| t.iter().zip(p).filter(|(a, b)| a == b).count())
        .sum();
    Ok(matches as f64 / cells as f64)
}

/// Fraction of rows whose every label is predicted correctly.
pub fn subset_accuracy(y_true: &[Vec<u8>], y_pred: &[Vec<u8>]) -> Result<f64> {
    check_shapes(y_true, y_pred)?;
    if y_true.is_empty() {
        return Ok(0.0);
    }
    let exact = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(exact as f64 / y_true.len() as f64)
}

/// Classification report for one label column.
pub fn classification_report(name: &str, y_true: &[u8], y_pred: &[u8]) -> CategoryReport {
    // confusion[actual][predicted]
    let mut confusion = [[0usize; 2]; 2];
    for (&actual, &predicted) in y_true.iter().zip(y_pred) {
        confusion[usize::from(actual.min(1))][usize::from(predicted.min(1))] += 1;
    }

    let class = |label: usize| {
        let other = 1 - label;
        ClassMetrics::from_counts(
            confusion[label][label],
            confusion[other][label],
            confusion[label][other],
        )
    };
    let classes = [class(0), class(1)];

    let total = y_true.len();
    let accuracy = if total == 0 {
        0.0
    } else {
        (confusion[0][0] + confusion[1][1]) as f64 / total as f64
    };

    let average = |weight: &dyn Fn(&ClassMetrics) -> f64| {
        let norm: f64 = classes.iter().map(weight).sum();
        let mean = |metric: fn(&ClassMetrics) -> f64| {
            if norm == 0.0 {
                0.0
            } else {
                classes.iter().map(|c| weight(c) * metric(c)).sum::<f64>() / norm
            }
        };
        ClassMetrics {
            precision: mean(|c| c.precision),
            recall: mean(|c| c.recall),
            f1: mean(|c| c.f1),
            support: total,
        }
    };

    let macro_avg = average(&|_| 1.0);
    let weighted_avg = average(&|c| c.support as f64);

    CategoryReport {
        name: name.to_string(),
        classes,
        accuracy,
        macro_avg,
        weighted_avg,
    }
}

/// Build a full report from true and predicted label matrices.
pub fn evaluate_predictions(
    category_names: &[String],
    y_true: &[Vec<u8>],
    y_pred: &[Vec<u8>],
) -> Result<Report> {
    let width = check_shapes(y_true, y_pred)?;
    if !y_true.is_empty() && width != category_names.len() {
        return Err(TriageError::schema(format!(
            "Label rows have {width} values but {} categories are named",
            category_names.len()
        )));
    }

    let categories = category_names
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let actual: Vec<u8> = y_true.iter().map(|row| row[c]).collect();
            let predicted: Vec<u8> = y_pred.iter().map(|row| row[c]).collect();
            classification_report(name, &actual, &predicted)
        })
        .collect();

    Ok(Report {
        categories,
        accuracy: cell_accuracy(y_true, y_pred)?,
        subset_accuracy: subset_accuracy(y_true, y_pred)?,
        n_samples: y_true.len(),
    })
}

/// Predict held-out messages with a fitted pipeline and report the results.
pub fn evaluate<S: AsRef<str> + Sync>(
    pipeline: &FittedPipeline,
    messages: &[S],
    y_test: &[Vec<u8>],
) -> Result<Report> {
    let y_pred = pipeline.predict(messages)?;
    let report = evaluate_predictions(pipeline.category_names(), y_test, &y_pred)?;
    info!(
        "Evaluated {} messages: accuracy {:.4}, subset accuracy {:.4}",
        report.n_samples, report.accuracy, report.subset_accuracy
    );
    Ok(report)
}

/// Evaluate a fitted pipeline on a held-out dataset.
pub fn evaluate_dataset(pipeline: &FittedPipeline, dataset: &Dataset) -> Result<Report> {
    if pipeline.category_names() != dataset.category_names() {
        return Err(TriageError::schema(
            "Dataset categories differ from the pipeline's categories",
        ));
    }
    evaluate(pipeline, &dataset.texts(), &dataset.label_matrix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_and_subset_accuracy() {
        let y_test = vec![vec![1, 0], vec![0, 1]];
        let y_pred = vec![vec![1, 0], vec![1, 1]];
        assert_eq!(cell_accuracy(&y_test, &y_pred).unwrap(), 0.75);
        assert_eq!(subset_accuracy(&y_test, &y_pred).unwrap(), 0.5);
    }

    #[test]
    fn test_shape_errors() {
        let y_test = vec![vec![1, 0], vec![0, 1]];
        assert!(cell_accuracy(&y_test, &[vec![1, 0]]).is_err());
        assert!(matches!(
            cell_accuracy(&y_test, &[vec![1, 0], vec![1]]),
            Err(TriageError::Schema(_))
        ));
    }

    #[test]
    fn test_classification_report() {
        let report = classification_report("water", &[1, 1, 0, 0, 0], &[1, 0, 1, 0, 0]);

        let positive = report.positive();
        assert_eq!(positive.precision, 0.5);
        assert_eq!(positive.recall, 0.5);
        assert_eq!(positive.support, 2);

        let negative = report.negative();
        assert!((negative.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((negative.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(negative.support, 3);

        assert_eq!(report.accuracy, 0.6);
        assert!((report.macro_avg.f1 - (0.5 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
        assert!((report.weighted_avg.recall - 0.6).abs() < 1e-12);
        assert_eq!(report.weighted_avg.support, 5);
    }

    #[test]
    fn test_all_negative_column() {
        let report = classification_report("fire", &[0, 0, 0], &[0, 0, 0]);
        assert_eq!(report.positive().precision, 0.0);
        assert_eq!(report.positive().f1, 0.0);
        assert_eq!(report.negative().f1, 1.0);
        assert_eq!(report.accuracy, 1.0);
    }

    #[test]
    fn test_evaluate_predictions() {
        let names = vec!["water".to_string(), "food".to_string()];
        let y_test = vec![vec![1, 0], vec![0, 1]];
        let y_pred = vec![vec![1, 0], vec![1, 1]];

        let report = evaluate_predictions(&names, &y_test, &y_pred).unwrap();
        assert_eq!(report.accuracy, 0.75);
        assert_eq!(report.n_samples, 2);
        assert_eq!(report.category("food").unwrap().accuracy, 1.0);
        assert_eq!(report.category("water").unwrap().accuracy, 0.5);

        let text = report.to_string();
        assert!(text.contains("water"));
        assert!(text.contains("Model accuracy: 75.000%"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["accuracy"], 0.75);

        assert!(evaluate_predictions(&names[..1], &y_test, &y_pred).is_err());
    }
}
