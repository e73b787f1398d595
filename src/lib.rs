//! # relief-triage
//!
//! Multi-label triage of disaster-relief messages.
//!
//! ## Features
//!
//! - Cleaning and joining of raw message and category tables
//! - Deterministic text normalization (URL masking, Treebank tokenization,
//!   stop words, Porter stemming, lemmatization)
//! - TF-IDF features over a vocabulary learned from training data only
//! - One independent binary classifier per category
//! - Parallel cross-validated grid search over pipeline hyperparameters
//! - Per-category classification reports
//! - File and in-memory stores for datasets and fitted pipelines
//!
//! ## Example
//!
//! ```
//! use relief_triage::dataset::{Genre, RawCategoryRecord, RawMessageRecord, clean};
//! use relief_triage::model::{FittedPipeline, LearnerConfig, LogisticConfig, PipelineConfig};
//!
//! let messages = vec![
//!     RawMessageRecord::new(1, "We need water", Genre::Direct),
//!     RawMessageRecord::new(2, "No food left", Genre::Social),
//!     RawMessageRecord::new(3, "Water is dirty", Genre::News),
//!     RawMessageRecord::new(4, "Send food please", Genre::Direct),
//! ];
//! let categories = vec![
//!     RawCategoryRecord::new(1, "water-1;food-0"),
//!     RawCategoryRecord::new(2, "water-0;food-1"),
//!     RawCategoryRecord::new(3, "water-1;food-0"),
//!     RawCategoryRecord::new(4, "water-0;food-1"),
//! ];
//! let dataset = clean(&messages, &categories).unwrap();
//!
//! let config = PipelineConfig {
//!     learner: LearnerConfig::Logistic(LogisticConfig::default()),
//!     ..PipelineConfig::default()
//! };
//! let pipeline = FittedPipeline::fit_messages(
//!     &config,
//!     &dataset.texts(),
//!     &dataset.label_matrix(),
//!     dataset.category_names(),
//! )
//! .unwrap();
//!
//! let predicted = pipeline.predict(&["clean water needed"]).unwrap();
//! assert_eq!(predicted[0].len(), 2);
//! ```

pub mod analysis;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod feature;
pub mod model;
pub mod search;
pub mod training;

pub mod prelude {
    pub use crate::analysis::normalize;
    pub use crate::dataset::{Dataset, RawCategoryRecord, RawMessageRecord, clean};
    pub use crate::error::{Result, TriageError};
    pub use crate::evaluation::{Report, evaluate};
    pub use crate::model::{FittedPipeline, ModelStore, PipelineConfig};
    pub use crate::search::{GridSearch, HyperparameterGrid, SearchConfig};
    pub use crate::training::{TrainingConfig, TrainingRun, train};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
