//! Random forest of gini decision trees over sparse features.
//!
//! Each tree is grown on a bootstrap sample of the training rows. At every
//! node a random subset of the features present in that node's rows is
//! searched for the threshold split with the lowest weighted gini impurity.
//! The forest predicts label 1 when the mean leaf probability across trees is
//! at least 0.5.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::feature::SparseVector;
use crate::model::classifier::{BinaryClassifier, validate_training_set};

/// Random forest hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees.
    pub n_estimators: usize,
    /// Maximum tree depth, unlimited when `None`.
    pub max_depth: Option<usize>,
    /// Minimum rows a node needs before it may be split.
    pub min_samples_split: usize,
    /// Features tried per split; defaults to the square root of the dimension.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        ForestConfig {
            n_estimators: 10,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

/// Seed for the forest of one category. The category fills the high 32 bits
/// and [`tree_seed`] the low 32, so every (category, tree) pair of a fit gets
/// its own stream.
pub fn category_seed(seed: u64, category: usize) -> u64 {
    seed ^ ((category as u64 & 0xFFFF_FFFF) << 32)
}

/// Seed for tree `tree` of a forest seeded with `seed`.
pub fn tree_seed(seed: u64, tree: usize) -> u64 {
    seed ^ (tree as u64 & 0xFFFF_FFFF)
}

impl ForestConfig {
    /// Check hyperparameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(TriageError::invalid_argument("n_estimators must be positive"));
        }
        if self.max_depth == Some(0) {
            return Err(TriageError::invalid_argument("max_depth must be positive"));
        }
        if self.min_samples_split < 2 {
            return Err(TriageError::invalid_argument(
                "min_samples_split must be at least 2",
            ));
        }
        if self.max_features == Some(0) {
            return Err(TriageError::invalid_argument("max_features must be positive"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        /// Fraction of label-1 rows that reached this leaf.
        probability: f64,
    },
    Split {
        feature: usize,
        /// Rows with a value at or below the threshold go left.
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Gini impurity of a node holding `positives` label-1 rows out of `total`.
fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Borrowed training data and growth limits shared by every node of a tree.
struct TreeBuilder<'a> {
    x: &'a [SparseVector],
    y: &'a [u8],
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: usize,
}

impl TreeBuilder<'_> {
    fn leaf(&self, indices: &[usize]) -> TreeNode {
        let positives = indices.iter().filter(|&&i| self.y[i] == 1).count();
        TreeNode::Leaf {
            probability: positives as f64 / indices.len().max(1) as f64,
        }
    }

    fn build_tree(&self, indices: &[usize], depth: usize, rng: &mut StdRng) -> TreeNode {
        let positives = indices.iter().filter(|&&i| self.y[i] == 1).count();
        let pure = positives == 0 || positives == indices.len();

        if pure
            || indices.len() < self.min_samples_split
            || self.max_depth.is_some_and(|max| depth >= max)
        {
            return self.leaf(indices);
        }

        let Some(split) = self.find_best_split(indices, positives, rng) else {
            return self.leaf(indices);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[i].get(split.feature) <= split.threshold);

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build_tree(&left, depth + 1, rng)),
            right: Box::new(self.build_tree(&right, depth + 1, rng)),
        }
    }

    /// Search a random subset of the features present in `indices`.
    fn find_best_split(
        &self,
        indices: &[usize],
        positives: usize,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let present: Vec<usize> = indices
            .iter()
            .flat_map(|&i| self.x[i].iter().map(|(f, _)| f))
            .collect::<BTreeSet<usize>>()
            .into_iter()
            .collect();
        if present.is_empty() {
            return None;
        }

        let amount = self.max_features.min(present.len());
        let sampled = rand::seq::index::sample(rng, present.len(), amount);

        let total = indices.len();
        let mut best: Option<SplitCandidate> = None;
        let mut best_impurity = gini(positives, total);

        for position in sampled.iter() {
            let feature = present[position];
            let mut values: Vec<(f64, u8)> = indices
                .iter()
                .map(|&i| (self.x[i].get(feature), self.y[i]))
                .collect();
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_positives = 0;
            for split_at in 1..total {
                left_positives += usize::from(values[split_at - 1].1);
                if values[split_at - 1].0 == values[split_at].0 {
                    continue;
                }

                let right_total = total - split_at;
                let impurity = (split_at as f64 * gini(left_positives, split_at)
                    + right_total as f64 * gini(positives - left_positives, right_total))
                    / total as f64;

                if impurity < best_impurity {
                    best_impurity = impurity;
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (values[split_at - 1].0 + values[split_at].0) / 2.0,
                        impurity,
                    });
                }
            }
        }

        best.filter(|b| b.impurity.is_finite())
    }
}

/// A single classification tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
}

impl DecisionTree {
    /// Probability of label 1 for one row.
    pub fn predict_proba(&self, row: &SparseVector) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { probability } => return *probability,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row.get(*feature) <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Depth of the deepest leaf, zero for a single leaf.
    pub fn depth(&self) -> usize {
        fn depth_of(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }
}

/// Bagged ensemble of decision trees.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl RandomForest {
    /// Create an unfitted forest.
    pub fn new(config: ForestConfig) -> Self {
        RandomForest {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    /// Get the hyperparameters.
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// The fitted trees.
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean leaf probability of label 1 across trees, per row.
    pub fn predict_proba(&self, x: &[SparseVector]) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(TriageError::not_fitted("RandomForest has not been fitted"));
        }
        if let Some(v) = x.iter().find(|v| v.dim() != self.n_features) {
            return Err(TriageError::invalid_argument(format!(
                "Expected {} features, got {}",
                self.n_features,
                v.dim()
            )));
        }

        let n_trees = self.trees.len() as f64;
        Ok(x
            .iter()
            .map(|row| self.trees.iter().map(|t| t.predict_proba(row)).sum::<f64>() / n_trees)
            .collect())
    }
}

impl BinaryClassifier for RandomForest {
    fn fit(&mut self, x: &[SparseVector], y: &[u8]) -> Result<()> {
        self.config.validate()?;
        validate_training_set(x, y)?;

        let n_samples = x.len();
        let n_features = x[0].dim();
        if x.iter().any(|v| v.dim() != n_features) {
            return Err(TriageError::invalid_argument(
                "Feature rows have different dimensions",
            ));
        }

        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| ((n_features as f64).sqrt().ceil() as usize).max(1));

        let builder = TreeBuilder {
            x,
            y,
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            max_features,
        };
        let seed = self.config.seed;

        // Trees draw from independent seeded streams, so the result does not
        // depend on scheduling.
        self.trees = (0..self.config.n_estimators)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(tree_seed(seed, t));
                let bootstrap: Vec<usize> = (0..n_samples)
                    .map(|_| rng.random_range(0..n_samples))
                    .collect();
                DecisionTree {
                    root: builder.build_tree(&bootstrap, 0, &mut rng),
                }
            })
            .collect();
        self.n_features = n_features;

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
        !self.trees.is_empty()
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }
}
