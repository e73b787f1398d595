//! The composed normalize, vectorize and classify pipeline.
//!
//! [`PipelineConfig`] names one point of the hyperparameter space.
//! [`FittedPipeline::fit`] learns the vocabulary and the per-category
//! classifiers from training data only; the result is immutable and can be
//! shared across threads for any number of `predict` calls.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::normalize;
use crate::error::{Result, TriageError};
use crate::feature::{TfIdfVectorizer, VectorizerConfig, Vocabulary};
use crate::model::classifier::LearnerConfig;
use crate::model::multi_output::MultiOutputClassifier;

/// Vectorizer and learner settings for one pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub vectorizer: VectorizerConfig,
    pub learner: LearnerConfig,
}

/// Information recorded when a pipeline is fitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    /// Library version that produced the pipeline.
    pub version: String,
    /// Training timestamp.
    pub trained_at: DateTime<Utc>,
    /// Category names in label order.
    pub category_names: Vec<String>,
    /// Chosen hyperparameters, rendered as text.
    pub hyperparameters: BTreeMap<String, String>,
    /// Number of training messages.
    pub training_examples: usize,
}

/// A fitted vocabulary, TF-IDF statistics and per-category classifiers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedPipeline {
    config: PipelineConfig,
    vectorizer: TfIdfVectorizer,
    model: MultiOutputClassifier,
    metadata: PipelineMetadata,
}

/// Normalize messages in parallel, preserving order.
pub fn normalize_all<S: AsRef<str> + Sync>(messages: &[S]) -> Result<Vec<Vec<String>>> {
    messages
        .par_iter()
        .map(|message| normalize(message.as_ref()))
        .collect()
}

impl FittedPipeline {
    /// Fit a pipeline on normalized token sequences and their label rows.
    pub fn fit(
        config: &PipelineConfig,
        corpus: &[Vec<String>],
        labels: &[Vec<u8>],
        category_names: &[String],
    ) -> Result<Self> {
        if let Some(row) = labels.iter().find(|r| r.len() != category_names.len()) {
            return Err(TriageError::schema(format!(
                "Label rows have {} values but {} categories are named",
                row.len(),
                category_names.len()
            )));
        }

        let mut vectorizer = TfIdfVectorizer::new(config.vectorizer.clone());
        let features = vectorizer.fit_transform(corpus)?;

        let mut model = MultiOutputClassifier::new(config.learner.clone());
        model.fit(&features, labels)?;

        let metadata = PipelineMetadata {
            version: crate::VERSION.to_string(),
            trained_at: Utc::now(),
            category_names: category_names.to_vec(),
            hyperparameters: BTreeMap::new(),
            training_examples: corpus.len(),
        };

        Ok(FittedPipeline {
            config: config.clone(),
            vectorizer,
            model,
            metadata,
        })
    }

    /// Fit a pipeline on raw message texts.
    pub fn fit_messages<S: AsRef<str> + Sync>(
        config: &PipelineConfig,
        messages: &[S],
        labels: &[Vec<u8>],
        category_names: &[String],
    ) -> Result<Self> {
        let corpus = normalize_all(messages)?;
        Self::fit(config, &corpus, labels, category_names)
    }

    /// Record the hyperparameters this pipeline was selected with.
    pub fn with_hyperparameters(mut self, hyperparameters: BTreeMap<String, String>) -> Self {
        self.metadata.hyperparameters = hyperparameters;
        self
    }

    /// Predict label vectors for raw messages.
    pub fn predict<S: AsRef<str> + Sync>(&self, messages: &[S]) -> Result<Vec<Vec<u8>>> {
        let corpus = normalize_all(messages)?;
        self.predict_tokens(&corpus)
    }

    /// Predict label vectors for already normalized token sequences.
    pub fn predict_tokens(&self, corpus: &[Vec<String>]) -> Result<Vec<Vec<u8>>> {
        let features = self.vectorizer.transform_batch(corpus)?;
        self.model.predict(&features)
    }

    /// Predict one message and pair each label with its category name.
    pub fn predict_named(&self, message: &str) -> Result<Vec<(String, u8)>> {
        let labels = self.predict(&[message])?;
        let row = labels.into_iter().next().unwrap_or_default();
        Ok(self
            .metadata
            .category_names
            .iter()
            .cloned()
            .zip(row)
            .collect())
    }

    /// Get the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get the fitted vectorizer.
    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    /// Get the learned vocabulary.
    pub fn vocabulary(&self) -> Result<&Vocabulary> {
        self.vectorizer.vocabulary()
    }

    /// Get the multi-output model.
    pub fn model(&self) -> &MultiOutputClassifier {
        &self.model
    }

    /// Get the training metadata.
    pub fn metadata(&self) -> &PipelineMetadata {
        &self.metadata
    }

    /// Category names in label order.
    pub fn category_names(&self) -> &[String] {
        &self.metadata.category_names
    }
}
