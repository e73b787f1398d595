//! TF-IDF vectorizer over normalized token sequences.

use std::fmt;

use ahash::{AHashMap, AHashSet};
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::feature::sparse::SparseVector;
use crate::feature::vocabulary::Vocabulary;

/// A document-frequency bound, as an absolute count or a fraction of the corpus.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocFrequency {
    Count(usize),
    Fraction(f64),
}

impl DocFrequency {
    /// The bound as a document count for a corpus of `n_documents`.
    fn resolve(&self, n_documents: usize) -> f64 {
        match *self {
            DocFrequency::Count(count) => count as f64,
            DocFrequency::Fraction(fraction) => fraction * n_documents as f64,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        match *self {
            DocFrequency::Fraction(f) if !(0.0..=1.0).contains(&f) => Err(
                TriageError::invalid_argument(format!("{name} fraction must be in [0, 1], got {f}")),
            ),
            _ => Ok(()),
        }
    }
}

/// Per-document vector normalization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Norm {
    /// Scale each vector to unit Euclidean length.
    #[default]
    L2,
    /// Leave weights as computed.
    Raw,
}

/// Vectorizer options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Terms in fewer documents than this are dropped.
    pub min_df: DocFrequency,
    /// Terms in more documents than this are dropped.
    pub max_df: DocFrequency,
    /// Keep only the most frequent terms across the corpus.
    pub max_features: Option<usize>,
    /// Multiply term frequencies by inverse document frequency.
    pub use_idf: bool,
    /// Add one to document counts, as if an extra document held every term.
    pub smooth_idf: bool,
    /// Replace tf with 1 + ln(tf).
    pub sublinear_tf: bool,
    pub norm: Norm,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        VectorizerConfig {
            min_df: DocFrequency::Count(1),
            max_df: DocFrequency::Fraction(1.0),
            max_features: None,
            use_idf: true,
            smooth_idf: true,
            sublinear_tf: false,
            norm: Norm::L2,
        }
    }
}

impl VectorizerConfig {
    /// Check option ranges.
    pub fn validate(&self) -> Result<()> {
        self.min_df.validate("min_df")?;
        self.max_df.validate("max_df")?;
        if self.max_features == Some(0) {
            return Err(TriageError::invalid_argument(
                "max_features must be positive",
            ));
        }
        Ok(())
    }
}

/// TF-IDF vectorizer with a two-phase fit/transform contract.
///
/// `fit` learns the vocabulary and IDF weights from a training corpus; after
/// that the vectorizer is read-only and safe to share across threads.
#[derive(Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    /// Learned vocabulary, `None` until fitted.
    vocabulary: Option<Vocabulary>,
    /// Inverse document frequency per vocabulary index.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
}

impl fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("config", &self.config)
            .field(
                "vocabulary_size",
                &self.vocabulary.as_ref().map(Vocabulary::len),
            )
            .field("n_documents", &self.n_documents)
            .finish()
    }
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new(VectorizerConfig::default())
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Self {
        TfIdfVectorizer {
            config,
            vocabulary: None,
            idf: Vec::new(),
            n_documents: 0,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Check whether `fit` has run.
    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// The learned vocabulary.
    pub fn vocabulary(&self) -> Result<&Vocabulary> {
        self.vocabulary
            .as_ref()
            .ok_or_else(|| TriageError::not_fitted("TfIdfVectorizer has not been fitted"))
    }

    /// The learned IDF weights, indexed like the vocabulary.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Number of documents in the fitting corpus.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Learn the vocabulary and IDF weights from a corpus of token sequences.
    ///
    /// Refitting replaces all previously learned state.
    pub fn fit(&mut self, corpus: &[Vec<String>]) -> Result<&Vocabulary> {
        self.config.validate()?;
        if corpus.is_empty() {
            return Err(TriageError::invalid_argument(
                "Cannot fit a vectorizer on an empty corpus",
            ));
        }

        let n_documents = corpus.len();
        let mut document_frequency: AHashMap<&str, usize> = AHashMap::new();
        let mut term_frequency: AHashMap<&str, usize> = AHashMap::new();

        for document in corpus {
            let unique: AHashSet<&str> = document.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
            for term in document {
                *term_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let min_df = self.config.min_df.resolve(n_documents);
        let max_df = self.config.max_df.resolve(n_documents);
        if max_df < min_df {
            return Err(TriageError::invalid_argument(format!(
                "max_df ({max_df}) corresponds to fewer documents than min_df ({min_df})"
            )));
        }

        let mut kept: Vec<&str> = document_frequency
            .iter()
            .filter(|&(_, &df)| (df as f64) >= min_df && (df as f64) <= max_df)
            .map(|(&term, _)| term)
            .collect();

        if let Some(limit) = self.config.max_features {
            // Highest corpus frequency first, ties broken alphabetically.
            kept.sort_by(|a, b| term_frequency[b].cmp(&term_frequency[a]).then(a.cmp(b)));
            kept.truncate(limit);
        }

        let vocabulary = Vocabulary::from_terms(kept);
        if vocabulary.is_empty() {
            warn!("Vectorizer vocabulary is empty after pruning");
        }

        let n = n_documents as f64;
        let idf = vocabulary
            .terms()
            .iter()
            .map(|term| {
                let df = document_frequency[term.as_str()] as f64;
                if self.config.smooth_idf {
                    ((1.0 + n) / (1.0 + df)).ln() + 1.0
                } else {
                    (n / df).ln() + 1.0
                }
            })
            .collect();

        debug!(
            "Fitted vectorizer: {} terms from {} documents",
            vocabulary.len(),
            n_documents
        );

        self.idf = idf;
        self.n_documents = n_documents;
        Ok(self.vocabulary.insert(vocabulary))
    }

    /// Convert one token sequence into a TF-IDF vector.
    ///
    /// Tokens outside the vocabulary are ignored.
    pub fn transform<S: AsRef<str>>(&self, tokens: &[S]) -> Result<SparseVector> {
        let vocabulary = self.vocabulary()?;

        let mut counts: AHashMap<usize, f64> = AHashMap::new();
        for token in tokens {
            if let Some(index) = vocabulary.get(token.as_ref()) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = SparseVector::from_pairs(vocabulary.len(), counts);
        let sublinear = self.config.sublinear_tf;
        let use_idf = self.config.use_idf;
        vector.map_values(|index, tf| {
            let tf = if sublinear { 1.0 + tf.ln() } else { tf };
            if use_idf { tf * self.idf[index] } else { tf }
        });

        if self.config.norm == Norm::L2 {
            vector.normalize_l2();
        }

        Ok(vector)
    }

    /// Transform many token sequences in parallel, preserving order.
    pub fn transform_batch(&self, corpus: &[Vec<String>]) -> Result<Vec<SparseVector>> {
        corpus.par_iter().map(|tokens| self.transform(tokens)).collect()
    }

    /// Fit on a corpus, then transform that same corpus.
    pub fn fit_transform(&mut self, corpus: &[Vec<String>]) -> Result<Vec<SparseVector>> {
        self.fit(corpus)?;
        self.transform_batch(corpus)
    }
}
