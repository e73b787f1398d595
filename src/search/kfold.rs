//! K-fold cross-validation splits.

use serde::{Deserialize, Serialize};

use crate::dataset::split::shuffled_indices;
use crate::error::{Result, TriageError};

/// Train and held-out row indices for one fold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// K-fold cross-validator.
///
/// Rows are cut into K contiguous folds (after an optional seeded shuffle);
/// when the row count does not divide evenly, the first folds get one extra
/// row each. Each fold is held out once while the rest form its training set.
///
/// `K = 1` is the degenerate resubstitution case: the single fold trains and
/// scores on every row.
///
/// # Examples
///
/// ```
/// use relief_triage::search::KFold;
///
/// let folds = KFold::new(3).split(7).unwrap();
/// assert_eq!(folds[0].test, vec![0, 1, 2]);
/// assert_eq!(folds[1].test, vec![3, 4]);
/// assert_eq!(folds[2].train, vec![0, 1, 2, 3, 4]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KFold {
    n_splits: usize,
    shuffle_seed: Option<u64>,
}

impl KFold {
    /// Create a cross-validator with `n_splits` folds and no shuffling.
    pub fn new(n_splits: usize) -> Self {
        KFold {
            n_splits,
            shuffle_seed: None,
        }
    }

    /// Shuffle rows with a seeded generator before cutting folds.
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Number of folds.
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generate the folds for `n_samples` rows.
    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>> {
        if self.n_splits == 0 {
            return Err(TriageError::invalid_argument(
                "Number of folds must be at least 1",
            ));
        }
        if n_samples == 0 {
            return Err(TriageError::invalid_argument(
                "Cannot cross-validate zero rows",
            ));
        }
        if self.n_splits > n_samples {
            return Err(TriageError::invalid_argument(format!(
                "Cannot have {} folds with only {} rows",
                self.n_splits, n_samples
            )));
        }

        let indices = match self.shuffle_seed {
            Some(seed) => shuffled_indices(n_samples, seed),
            None => (0..n_samples).collect(),
        };

        if self.n_splits == 1 {
            return Ok(vec![Fold {
                train: indices.clone(),
                test: indices,
            }]);
        }

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for i in 0..self.n_splits {
            let end = start + fold_size + usize::from(i < remainder);

            let mut train = Vec::with_capacity(n_samples - (end - start));
            train.extend_from_slice(&indices[..start]);
            train.extend_from_slice(&indices[end..]);

            folds.push(Fold {
                train,
                test: indices[start..end].to_vec(),
            });
            start = end;
        }

        Ok(folds)
    }
}
