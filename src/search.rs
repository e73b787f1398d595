//! Hyperparameter search with K-fold cross-validation.
//!
//! A [`HyperparameterGrid`] maps parameter names to candidate values; every
//! combination is a candidate. [`GridSearch`] scores each candidate on every
//! fold in parallel, picks the best mean score (earliest on ties) and refits
//! the winner on the full training set.
//!
//! # Examples
//!
//! ```
//! use relief_triage::search::{GridSearch, HyperparameterGrid, SearchConfig};
//!
//! let config = SearchConfig {
//!     folds: 2,
//!     n_jobs: Some(1),
//!     grid: HyperparameterGrid::new()
//!         .with("learner", ["logistic"])
//!         .with("vectorizer.use_idf", [true, false]),
//!     ..SearchConfig::default()
//! };
//! let search = GridSearch::new(config).unwrap();
//!
//! let corpus: Vec<Vec<String>> = ["need water", "need food", "water", "food"]
//!     .iter()
//!     .map(|d| d.split(' ').map(str::to_string).collect())
//!     .collect();
//! let labels = vec![vec![1, 0], vec![0, 1], vec![1, 0], vec![0, 1]];
//! let names = vec!["water".to_string(), "food".to_string()];
//!
//! let outcome = search.fit_tokens(&corpus, &labels, &names).unwrap();
//! assert_eq!(outcome.candidates.len(), 2);
//! ```

pub mod config;
pub mod engine;
pub mod grid;
pub mod kfold;

pub use config::{Scoring, SearchConfig};
pub use engine::{CandidateResult, GridSearch, SearchOutcome};
pub use grid::{HyperparameterGrid, ParamSet, ParamValue, apply_params, describe};
pub use kfold::{Fold, KFold};
