//! Per-category base learners, the multi-output wrapper, the fitted
//! pipeline, and model persistence.
//!
//! # Examples
//!
//! ```
//! use relief_triage::model::{FittedPipeline, PipelineConfig};
//!
//! let messages = ["we need water", "send food", "water and food", "roads are blocked"];
//! let labels = vec![vec![1, 0], vec![0, 1], vec![1, 1], vec![0, 0]];
//! let names = vec!["water".to_string(), "food".to_string()];
//!
//! let pipeline =
//!     FittedPipeline::fit_messages(&PipelineConfig::default(), &messages, &labels, &names).unwrap();
//! let predictions = pipeline.predict(&["is there water"]).unwrap();
//! assert_eq!(predictions[0].len(), 2);
//! ```

pub mod classifier;
pub mod forest;
pub mod logistic;
pub mod multi_output;
pub mod pipeline;
pub mod store;

pub use classifier::{BinaryClassifier, ConstantClassifier, FittedClassifier, LearnerConfig};
pub use forest::{DecisionTree, ForestConfig, RandomForest};
pub use logistic::{LogisticConfig, LogisticRegression};
pub use multi_output::MultiOutputClassifier;
pub use pipeline::{FittedPipeline, PipelineConfig, PipelineMetadata, normalize_all};
pub use store::{FileModelStore, MemoryModelStore, ModelStore};
