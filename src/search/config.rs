//! Configuration for the hyperparameter search.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::evaluation::{cell_accuracy, evaluate_predictions, subset_accuracy};
use crate::model::PipelineConfig;
use crate::search::grid::HyperparameterGrid;

/// How a fold's predictions are scored. Higher is better.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    /// Fraction of rows with every label right.
    #[default]
    SubsetAccuracy,
    /// Fraction of (row, category) cells right.
    CellAccuracy,
    /// Mean over categories of the macro-averaged F1.
    MacroF1,
}

impl Scoring {
    /// Score predicted labels against true labels.
    pub fn score(&self, y_true: &[Vec<u8>], y_pred: &[Vec<u8>]) -> Result<f64> {
        match self {
            Scoring::SubsetAccuracy => subset_accuracy(y_true, y_pred),
            Scoring::CellAccuracy => cell_accuracy(y_true, y_pred),
            Scoring::MacroF1 => {
                let width = y_true.first().map(Vec::len).unwrap_or(0);
                let names: Vec<String> = (0..width).map(|c| c.to_string()).collect();
                Ok(evaluate_predictions(&names, y_true, y_pred)?.macro_f1())
            }
        }
    }
}

/// Settings for a cross-validated grid search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of cross-validation folds.
    pub folds: usize,
    /// Shuffle rows with this seed before cutting folds.
    pub shuffle_seed: Option<u64>,
    /// Worker threads; defaults to the number of CPUs.
    pub n_jobs: Option<usize>,
    pub scoring: Scoring,
    /// Settings every candidate starts from.
    pub base: PipelineConfig,
    pub grid: HyperparameterGrid,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            folds: 3,
            shuffle_seed: None,
            n_jobs: None,
            scoring: Scoring::default(),
            base: PipelineConfig::default(),
            grid: HyperparameterGrid::new()
                .with("forest.n_estimators", [10i64, 20])
                .with("vectorizer.use_idf", [true, false]),
        }
    }
}

impl SearchConfig {
    /// Number of worker threads to use.
    pub fn threads(&self) -> usize {
        self.n_jobs.unwrap_or_else(num_cpus::get).max(1)
    }
}
