//! The per-category base learner capability.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::feature::SparseVector;
use crate::model::forest::{ForestConfig, RandomForest, category_seed};
use crate::model::logistic::{LogisticConfig, LogisticRegression};

/// A single-output binary classifier over sparse feature vectors.
pub trait BinaryClassifier: Send + Sync {
    /// Fit on feature vectors and their 0/1 labels.
    fn fit(&mut self, x: &[SparseVector], y: &[u8]) -> Result<()>;

    /// Predict a 0/1 label per feature vector.
    fn predict(&self, x: &[SparseVector]) -> Result<Vec<u8>>;

    /// Check whether `fit` has run.
    fn is_fitted(&self) -> bool;

    /// Get the name of this classifier.
    fn name(&self) -> &'static str;
}

/// Check that a training set is usable for binary classification.
pub(crate) fn validate_training_set(x: &[SparseVector], y: &[u8]) -> Result<()> {
    if x.len() != y.len() {
        return Err(TriageError::invalid_argument(format!(
            "Feature rows ({}) and labels ({}) differ in length",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(TriageError::invalid_argument("Cannot fit with zero samples"));
    }
    if let Some(&label) = y.iter().find(|&&v| v > 1) {
        return Err(TriageError::data_integrity(format!(
            "Labels must be 0 or 1, found {label}"
        )));
    }
    Ok(())
}

/// Predicts the only class seen during training.
///
/// Stands in for a real learner when a category column holds a single class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantClassifier {
    value: Option<u8>,
}

impl ConstantClassifier {
    /// A classifier that always predicts `value`.
    pub fn new(value: u8) -> Self {
        ConstantClassifier { value: Some(value) }
    }

    /// The predicted class, once fitted.
    pub fn value(&self) -> Option<u8> {
        self.value
    }
}

impl BinaryClassifier for ConstantClassifier {
    fn fit(&mut self, x: &[SparseVector], y: &[u8]) -> Result<()> {
        validate_training_set(x, y)?;
        let positives = y.iter().filter(|&&v| v == 1).count();
        self.value = Some(u8::from(positives * 2 >= y.len() && positives > 0));
        Ok(())
    }

    fn predict(&self, x: &[SparseVector]) -> Result<Vec<u8>> {
        let value = self
            .value
            .ok_or_else(|| TriageError::not_fitted("ConstantClassifier has not been fitted"))?;
        Ok(vec![value; x.len()])
    }

    fn is_fitted(&self) -> bool {
        self.value.is_some()
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Which base learner to train per category, with its hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnerConfig {
    Logistic(LogisticConfig),
    RandomForest(ForestConfig),
}

impl Default for LearnerConfig {
    fn default() -> Self {
        LearnerConfig::RandomForest(ForestConfig::default())
    }
}

impl LearnerConfig {
    /// Short name of the learner kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LearnerConfig::Logistic(_) => "logistic",
            LearnerConfig::RandomForest(_) => "random_forest",
        }
    }

    /// Fit a classifier for the category at `category` on one label column.
    ///
    /// A column holding a single class yields a [`ConstantClassifier`].
    pub fn fit(&self, x: &[SparseVector], y: &[u8], category: usize) -> Result<FittedClassifier> {
        validate_training_set(x, y)?;

        let positives = y.iter().filter(|&&v| v == 1).count();
        if positives == 0 || positives == y.len() {
            let mut constant = ConstantClassifier::default();
            constant.fit(x, y)?;
            return Ok(FittedClassifier::Constant(constant));
        }

        match self {
            LearnerConfig::Logistic(config) => {
                let mut model = LogisticRegression::new(config.clone());
                model.fit(x, y)?;
                Ok(FittedClassifier::Logistic(model))
            }
            LearnerConfig::RandomForest(config) => {
                let config = ForestConfig {
                    seed: category_seed(config.seed, category),
                    ..config.clone()
                };
                let mut model = RandomForest::new(config);
                model.fit(x, y)?;
                Ok(FittedClassifier::RandomForest(model))
            }
        }
    }
}

/// A fitted base learner of any supported kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FittedClassifier {
    Constant(ConstantClassifier),
    Logistic(LogisticRegression),
    RandomForest(RandomForest),
}

impl FittedClassifier {
    fn inner(&self) -> &dyn BinaryClassifier {
        match self {
            FittedClassifier::Constant(c) => c,
            FittedClassifier::Logistic(c) => c,
            FittedClassifier::RandomForest(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn BinaryClassifier {
        match self {
            FittedClassifier::Constant(c) => c,
            FittedClassifier::Logistic(c) => c,
            FittedClassifier::RandomForest(c) => c,
        }
    }
}

impl BinaryClassifier for FittedClassifier {
    fn fit(&mut self, x: &[SparseVector], y: &[u8]) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &[SparseVector]) -> Result<Vec<u8>> {
        self.inner().predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }
}
