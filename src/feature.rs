//! Feature extraction: sparse TF-IDF vectors over a learned vocabulary.
//!
//! The vectorizer works on token sequences produced by
//! [`crate::analysis::normalize`]. It learns its [`Vocabulary`] and IDF
//! statistics from a training corpus once, and every later transform uses
//! those statistics unchanged. Tokens outside the vocabulary are ignored.
//!
//! # Examples
//!
//! ```
//! use relief_triage::feature::{TfIdfVectorizer, VectorizerConfig};
//!
//! let corpus = vec![
//!     vec!["need".to_string(), "water".to_string()],
//!     vec!["need".to_string(), "tent".to_string()],
//! ];
//!
//! let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig::default());
//! let vectors = vectorizer.fit_transform(&corpus).unwrap();
//!
//! assert_eq!(vectorizer.vocabulary().unwrap().terms(), &["need", "tent", "water"]);
//! assert_eq!(vectors[0].dim(), 3);
//! assert!((vectors[0].l2_norm() - 1.0).abs() < 1e-12);
//! ```

pub mod sparse;
pub mod tfidf;
pub mod vocabulary;

pub use sparse::SparseVector;
pub use tfidf::{DocFrequency, Norm, TfIdfVectorizer, VectorizerConfig};
pub use vocabulary::Vocabulary;
