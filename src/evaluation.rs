//! Per-category classification reports and aggregate accuracy.
//!
//! The aggregate `accuracy` of a [`Report`] is the cell-wise match rate over
//! the whole label matrix, not the fraction of messages with every label
//! right; the latter is reported separately as `subset_accuracy`.

pub mod evaluator;
pub mod report;

pub use evaluator::{
    cell_accuracy, classification_report, evaluate, evaluate_dataset, evaluate_predictions,
    subset_accuracy,
};
pub use report::{CategoryReport, ClassMetrics, Report};
