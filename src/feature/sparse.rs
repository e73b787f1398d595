//! Sparse feature vectors.

use serde::{Deserialize, Serialize};

/// A vector of fixed logical dimension storing only its non-zero entries.
///
/// Entries are kept sorted by index with no duplicates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// An all-zero vector of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        SparseVector {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build a vector from `(index, value)` pairs.
    ///
    /// Pairs may come in any order; values at a repeated index are summed,
    /// and zeros and out-of-range indices are dropped.
    pub fn from_pairs<I>(dim: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut pairs: Vec<(usize, f64)> = pairs.into_iter().filter(|&(i, _)| i < dim).collect();
        pairs.sort_by_key(|&(i, _)| i);

        let mut indices: Vec<usize> = Vec::with_capacity(pairs.len());
        let mut values: Vec<f64> = Vec::with_capacity(pairs.len());
        for (index, value) in pairs {
            match indices.last() {
                Some(&last) if last == index => {
                    if let Some(v) = values.last_mut() {
                        *v += value;
                    }
                }
                _ => {
                    indices.push(index);
                    values.push(value);
                }
            }
        }

        let mut vector = SparseVector {
            dim,
            indices,
            values,
        };
        vector.prune_zeros();
        vector
    }

    /// Build a vector from a dense slice.
    pub fn from_dense(values: &[f64]) -> Self {
        Self::from_pairs(values.len(), values.iter().copied().enumerate())
    }

    fn prune_zeros(&mut self) {
        let mut keep = 0;
        for i in 0..self.indices.len() {
            if self.values[i] != 0.0 {
                self.indices[keep] = self.indices[i];
                self.values[keep] = self.values[i];
                keep += 1;
            }
        }
        self.indices.truncate(keep);
        self.values.truncate(keep);
    }

    /// The logical dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Check if every component is zero.
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// The component at `index`, zero when not stored.
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Iterate over the stored `(index, value)` entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Dot product with a dense weight slice. Indices past its end count as zero.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.iter()
            .filter_map(|(i, v)| weights.get(i).map(|w| w * v))
            .sum()
    }

    /// Euclidean norm.
    pub fn l2_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scale to unit Euclidean norm. A zero vector stays zero.
    pub fn normalize_l2(&mut self) {
        let norm = self.l2_norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Apply `f` to every stored value.
    pub fn map_values<F: Fn(usize, f64) -> f64>(&mut self, f: F) {
        for (index, value) in self.indices.iter().zip(self.values.iter_mut()) {
            *value = f(*index, *value);
        }
        self.prune_zeros();
    }

    /// Expand into a dense vector.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (i, v) in self.iter() {
            dense[i] = v;
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_sorts_and_merges() {
        let v = SparseVector::from_pairs(5, vec![(3, 1.0), (1, 2.0), (3, 0.5), (9, 4.0), (0, 0.0)]);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(1, 2.0), (3, 1.5)]);
        assert_eq!(v.get(3), 1.5);
        assert_eq!(v.get(2), 0.0);
        assert_eq!(v.to_dense(), vec![0.0, 2.0, 0.0, 1.5, 0.0]);
    }

    #[test]
    fn test_dot_and_norm() {
        let mut v = SparseVector::from_dense(&[3.0, 0.0, 4.0]);
        assert_eq!(v.dot(&[1.0, 10.0, 2.0]), 11.0);
        assert_eq!(v.dot(&[1.0]), 3.0);
        assert_eq!(v.l2_norm(), 5.0);

        v.normalize_l2();
        assert!((v.get(0) - 0.6).abs() < 1e-12);
        assert!((v.get(2) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector() {
        let mut v = SparseVector::zeros(4);
        v.normalize_l2();
        assert!(v.is_zero());
        assert_eq!(v.dim(), 4);
        assert_eq!(v.l2_norm(), 0.0);
    }
}
