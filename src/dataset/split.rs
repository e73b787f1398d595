//! Seeded train/test partitioning.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::dataset::Dataset;
use crate::error::{Result, TriageError};

/// The indices `0..n` in a seeded random order.
pub(crate) fn shuffled_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices
}

/// Number of (train, test) rows for a split of `n` messages.
///
/// The test side gets `ceil(test_size * n)` rows.
fn split_sizes(n: usize, test_size: f64) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TriageError::invalid_argument(format!(
            "test_size must be between 0 and 1, got {test_size}"
        )));
    }

    let n_test = (n as f64 * test_size).ceil() as usize;
    let n_train = n.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(TriageError::invalid_argument(format!(
            "Split would result in empty train or test set (n_train={n_train}, n_test={n_test})"
        )));
    }

    Ok((n_train, n_test))
}

/// Partition a dataset into disjoint train and test datasets.
///
/// Every message lands in exactly one side. The same dataset, fraction and
/// seed always give the same partition.
///
/// # Examples
///
/// ```
/// use relief_triage::dataset::{Dataset, CategorySchema, Genre, LabeledMessage, train_test_split};
///
/// let messages = (0..10)
///     .map(|id| LabeledMessage {
///         id,
///         message: format!("message {id}"),
///         original: None,
///         genre: Genre::Direct,
///         labels: vec![(id % 2) as u8],
///     })
///     .collect();
/// let dataset = Dataset::new(CategorySchema::new(vec!["water".into()]), messages).unwrap();
///
/// let (train, test) = train_test_split(&dataset, 0.25, 42).unwrap();
/// assert_eq!(train.len(), 7);
/// assert_eq!(test.len(), 3);
/// ```
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    let (n_train, _) = split_sizes(dataset.len(), test_size)?;
    let indices = shuffled_indices(dataset.len(), seed);

    let train = dataset.subset(&indices[..n_train]);
    let test = dataset.subset(&indices[n_train..]);

    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::dataset::{CategorySchema, Genre, LabeledMessage};

    fn dataset(n: i64) -> Dataset {
        let messages = (0..n)
            .map(|id| LabeledMessage {
                id,
                message: format!("message {id}"),
                original: None,
                genre: Genre::Social,
                labels: vec![0, 1],
            })
            .collect();
        let schema = CategorySchema::new(vec!["water".to_string(), "food".to_string()]);
        Dataset::new(schema, messages).unwrap()
    }

    #[test]
    fn test_split_is_partition() {
        let data = dataset(20);
        let (train, test) = train_test_split(&data, 0.2, 7).unwrap();
        assert_eq!(train.len(), 16);
        assert_eq!(test.len(), 4);

        let train_ids: HashSet<i64> = train.messages().iter().map(|m| m.id).collect();
        let test_ids: HashSet<i64> = test.messages().iter().map(|m| m.id).collect();
        assert!(train_ids.is_disjoint(&test_ids));
        assert_eq!(train_ids.len() + test_ids.len(), 20);
    }

    #[test]
    fn test_split_rounds_test_side_up() {
        let data = dataset(11);
        let (train, test) = train_test_split(&data, 0.2, 1).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_split_is_reproducible() {
        let data = dataset(30);
        let (a, _) = train_test_split(&data, 0.3, 42).unwrap();
        let (b, _) = train_test_split(&data, 0.3, 42).unwrap();
        let (c, _) = train_test_split(&data, 0.3, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_invalid_fractions() {
        let data = dataset(5);
        for size in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                train_test_split(&data, size, 0),
                Err(TriageError::InvalidArgument(_))
            ));
        }
        assert!(train_test_split(&dataset(1), 0.5, 0).is_err());
    }
}
