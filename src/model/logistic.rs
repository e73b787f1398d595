//! Logistic regression over sparse features.
//!
//! Batch gradient descent on the mean log-loss with an L2 penalty on the
//! weights (the bias is not penalized). A sample is labeled 1 when its
//! predicted probability is at least 0.5.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::feature::SparseVector;
use crate::model::classifier::{BinaryClassifier, validate_training_set};

/// Logistic regression hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    /// Gradient descent step size.
    pub learning_rate: f64,
    /// Maximum number of passes over the training set.
    pub epochs: usize,
    /// L2 penalty strength.
    pub l2: f64,
    /// Stop early once every gradient component is below this.
    pub tolerance: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        LogisticConfig {
            learning_rate: 1.0,
            epochs: 200,
            l2: 1e-4,
            tolerance: 1e-6,
        }
    }
}

impl LogisticConfig {
    /// Check hyperparameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(TriageError::invalid_argument(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.epochs == 0 {
            return Err(TriageError::invalid_argument("epochs must be positive"));
        }
        if !(self.l2 >= 0.0 && self.l2.is_finite()) {
            return Err(TriageError::invalid_argument(format!(
                "l2 must be non-negative, got {}",
                self.l2
            )));
        }
        Ok(())
    }
}

/// Binary logistic regression classifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogisticRegression {
    config: LogisticConfig,
    /// Feature weights, empty until fitted.
    weights: Vec<f64>,
    bias: f64,
    fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(LogisticConfig::default())
    }
}

impl LogisticRegression {
    /// Create an unfitted classifier.
    pub fn new(config: LogisticConfig) -> Self {
        LogisticRegression {
            config,
            weights: Vec::new(),
            bias: 0.0,
            fitted: false,
        }
    }

    /// Get the hyperparameters.
    pub fn config(&self) -> &LogisticConfig {
        &self.config
    }

    /// Learned weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Learned bias.
    pub fn bias(&self) -> f64 {
        self.bias
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    fn check_dimension(&self, x: &[SparseVector]) -> Result<()> {
        match x.iter().find(|v| v.dim() != self.weights.len()) {
            Some(v) => Err(TriageError::invalid_argument(format!(
                "Expected {} features, got {}",
                self.weights.len(),
                v.dim()
            ))),
            None => Ok(()),
        }
    }

    /// Probability of label 1 for each sample.
    pub fn predict_proba(&self, x: &[SparseVector]) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(TriageError::not_fitted(
                "LogisticRegression has not been fitted",
            ));
        }
        self.check_dimension(x)?;
        Ok(x
            .iter()
            .map(|v| Self::sigmoid(v.dot(&self.weights) + self.bias))
            .collect())
    }
}

impl BinaryClassifier for LogisticRegression {
    fn fit(&mut self, x: &[SparseVector], y: &[u8]) -> Result<()> {
        self.config.validate()?;
        validate_training_set(x, y)?;

        let n_features = x[0].dim();
        self.weights = vec![0.0; n_features];
        self.bias = 0.0;
        self.check_dimension(x)?;

        let n = x.len() as f64;
        let mut weight_grad = vec![0.0; n_features];

        for _ in 0..self.config.epochs {
            weight_grad.iter_mut().for_each(|g| *g = 0.0);
            let mut bias_grad = 0.0;

            for (row, &label) in x.iter().zip(y) {
                let error = Self::sigmoid(row.dot(&self.weights) + self.bias) - f64::from(label);
                bias_grad += error;
                for (j, value) in row.iter() {
                    weight_grad[j] += error * value;
                }
            }

            bias_grad /= n;
            for (g, w) in weight_grad.iter_mut().zip(&self.weights) {
                *g = *g / n + self.config.l2 * w;
            }

            self.bias -= self.config.learning_rate * bias_grad;
            for (w, g) in self.weights.iter_mut().zip(&weight_grad) {
                *w -= self.config.learning_rate * g;
            }

            if !self.bias.is_finite() {
                return Err(TriageError::invalid_argument(
                    "Logistic regression diverged; lower the learning rate",
                ));
            }

            if bias_grad.abs() < self.config.tolerance
                && weight_grad.iter().all(|g| g.abs() < self.config.tolerance)
            {
                break;
            }
        }

        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &[SparseVector]) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p >= 0.5))
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn name(&self) -> &'static str {
        "logistic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<SparseVector>, Vec<u8>) {
        let x = vec![
            SparseVector::from_dense(&[1.0, 0.0, 0.2]),
            SparseVector::from_dense(&[0.9, 0.1, 0.0]),
            SparseVector::from_dense(&[0.0, 1.0, 0.3]),
            SparseVector::from_dense(&[0.1, 0.8, 0.0]),
        ];
        (x, vec![1, 1, 0, 0])
    }

    #[test]
    fn test_fit_separable() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();

        assert!(model.is_fitted());
        assert_eq!(model.predict(&x).unwrap(), y);
        assert!(model.weights()[0] > 0.0);
        assert!(model.weights()[1] < 0.0);

        let proba = model.predict_proba(&x[..1]).unwrap();
        assert!(proba[0] > 0.5 && proba[0] < 1.0);
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = separable();
        let model = LogisticRegression::default();
        assert!(model.predict(&x).unwrap_err().is_not_fitted());
    }

    #[test]
    fn test_dimension_mismatch() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();
        assert!(model.predict(&[SparseVector::zeros(5)]).is_err());
    }

    #[test]
    fn test_invalid_config() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new(LogisticConfig {
            learning_rate: 0.0,
            ..LogisticConfig::default()
        });
        assert!(matches!(model.fit(&x, &y), Err(TriageError::InvalidArgument(_))));
    }
}
