//! One independent binary classifier per category column.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::feature::SparseVector;
use crate::model::classifier::{BinaryClassifier, FittedClassifier, LearnerConfig};

/// A multi-label classifier built from per-category base learners.
///
/// Category `c` of every predicted label vector comes from the `c`-th
/// classifier alone; the classifiers share no parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiOutputClassifier {
    learner: LearnerConfig,
    classifiers: Vec<FittedClassifier>,
}

impl MultiOutputClassifier {
    /// Create an unfitted classifier that will train `learner` per category.
    pub fn new(learner: LearnerConfig) -> Self {
        MultiOutputClassifier {
            learner,
            classifiers: Vec::new(),
        }
    }

    /// Get the base learner configuration.
    pub fn learner(&self) -> &LearnerConfig {
        &self.learner
    }

    /// The fitted per-category classifiers, in category order.
    pub fn classifiers(&self) -> &[FittedClassifier] {
        &self.classifiers
    }

    /// Number of categories this classifier predicts.
    pub fn n_outputs(&self) -> usize {
        self.classifiers.len()
    }

    /// Check whether `fit` has run.
    pub fn is_fitted(&self) -> bool {
        !self.classifiers.is_empty()
    }

    /// Fit one classifier per column of the label matrix `y`.
    pub fn fit(&mut self, x: &[SparseVector], y: &[Vec<u8>]) -> Result<()> {
        if x.len() != y.len() {
            return Err(TriageError::invalid_argument(format!(
                "Feature rows ({}) and label rows ({}) differ in length",
                x.len(),
                y.len()
            )));
        }
        let n_outputs = y.first().map(Vec::len).unwrap_or(0);
        if n_outputs == 0 {
            return Err(TriageError::invalid_argument(
                "Label matrix has no categories",
            ));
        }
        if let Some(row) = y.iter().position(|r| r.len() != n_outputs) {
            return Err(TriageError::schema(format!(
                "Label row {row} has {} values, expected {n_outputs}",
                y[row].len()
            )));
        }

        let learner = &self.learner;
        self.classifiers = (0..n_outputs)
            .into_par_iter()
            .map(|category| {
                let column: Vec<u8> = y.iter().map(|row| row[category]).collect();
                learner.fit(x, &column, category)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Fitted {} {} classifiers on {} rows",
            n_outputs,
            self.learner.kind(),
            x.len()
        );
        Ok(())
    }

    /// Predict a label vector per feature row.
    pub fn predict(&self, x: &[SparseVector]) -> Result<Vec<Vec<u8>>> {
        if !self.is_fitted() {
            return Err(TriageError::not_fitted(
                "MultiOutputClassifier has not been fitted",
            ));
        }

        let columns = self
            .classifiers
            .par_iter()
            .map(|classifier| classifier.predict(x))
            .collect::<Result<Vec<_>>>()?;

        Ok((0..x.len())
            .map(|row| columns.iter().map(|column| column[row]).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::logistic::LogisticConfig;

    fn data() -> (Vec<SparseVector>, Vec<Vec<u8>>) {
        let x = vec![
            SparseVector::from_dense(&[1.0, 0.0]),
            SparseVector::from_dense(&[0.0, 1.0]),
            SparseVector::from_dense(&[1.0, 0.0]),
            SparseVector::from_dense(&[0.0, 1.0]),
        ];
        // Column 0 follows feature 0, column 1 is all zero, column 2 follows feature 1.
        let y = vec![vec![1, 0, 0], vec![0, 0, 1], vec![1, 0, 0], vec![0, 0, 1]];
        (x, y)
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = data();
        let mut model = MultiOutputClassifier::new(LearnerConfig::Logistic(LogisticConfig::default()));
        model.fit(&x, &y).unwrap();

        assert_eq!(model.n_outputs(), 3);
        assert_eq!(model.classifiers()[1].name(), "constant");
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_degenerate_column_with_forest() {
        let (x, y) = data();
        let mut model = MultiOutputClassifier::new(LearnerConfig::default());
        model.fit(&x, &y).unwrap();
        let predictions = model.predict(&x).unwrap();
        assert!(predictions.iter().all(|row| row[1] == 0));
    }

    #[test]
    fn test_errors() {
        let (x, y) = data();
        let model = MultiOutputClassifier::new(LearnerConfig::default());
        assert!(model.predict(&x).unwrap_err().is_not_fitted());

        let mut model = MultiOutputClassifier::new(LearnerConfig::default());
        assert!(model.fit(&x[..2], &y).is_err());

        let ragged = vec![vec![1, 0], vec![0], vec![1, 1], vec![0, 0]];
        assert!(matches!(model.fit(&x, &ragged), Err(TriageError::Schema(_))));
    }
}
