//! Labeled message datasets.
//!
//! This module turns the two raw input tables (messages and their encoded
//! categories) into a [`Dataset`]: an ordered list of [`LabeledMessage`]s that
//! all share one [`CategorySchema`].
//!
//! # Examples
//!
//! ```
//! use relief_triage::dataset::{Genre, RawCategoryRecord, RawMessageRecord, clean};
//!
//! let messages = vec![
//!     RawMessageRecord::new(1, "We need water", Genre::Direct),
//!     RawMessageRecord::new(2, "Roads are blocked", Genre::News),
//! ];
//! let categories = vec![
//!     RawCategoryRecord::new(1, "related-1;water-1"),
//!     RawCategoryRecord::new(2, "related-1;water-0"),
//! ];
//!
//! let dataset = clean(&messages, &categories).unwrap();
//! assert_eq!(dataset.len(), 2);
//! assert_eq!(dataset.category_names(), &["related", "water"]);
//! assert_eq!(dataset.column(1), Some(vec![1, 0]));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

pub mod categories;
pub mod cleaner;
pub mod loader;
pub mod record;
pub mod split;
pub mod store;

pub use categories::{CategorySchema, LabelPolicy};
pub use cleaner::{CleaningStats, DatasetCleaner, clean};
pub use loader::{load_categories_csv, load_messages_csv, read_categories, read_messages};
pub use record::{Genre, LabeledMessage, RawCategoryRecord, RawMessageRecord};
pub use split::train_test_split;
pub use store::{DatasetStore, FileDatasetStore, MemoryDatasetStore};

/// A cleaned collection of labeled messages sharing one category schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    schema: CategorySchema,
    messages: Vec<LabeledMessage>,
}

impl Dataset {
    /// Create a dataset, checking every message against the schema.
    pub fn new(schema: CategorySchema, messages: Vec<LabeledMessage>) -> Result<Self> {
        let dataset = Dataset { schema, messages };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Check that every message has one 0/1 label per category.
    pub fn validate(&self) -> Result<()> {
        for message in &self.messages {
            if message.labels.len() != self.schema.len() {
                return Err(TriageError::schema(format!(
                    "Message {} has {} labels, expected {}",
                    message.id,
                    message.labels.len(),
                    self.schema.len()
                )));
            }
            if let Some(value) = message.labels.iter().find(|&&v| v > 1) {
                return Err(TriageError::data_integrity(format!(
                    "Message {} has label value {value}",
                    message.id
                )));
            }
        }
        Ok(())
    }

    /// Get the category schema.
    pub fn schema(&self) -> &CategorySchema {
        &self.schema
    }

    /// Get the category names in label order.
    pub fn category_names(&self) -> &[String] {
        self.schema.names()
    }

    /// Get the messages.
    pub fn messages(&self) -> &[LabeledMessage] {
        &self.messages
    }

    /// Get the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the dataset has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Message texts in dataset order.
    pub fn texts(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.message.as_str()).collect()
    }

    /// The label matrix, one row per message.
    pub fn label_matrix(&self) -> Vec<Vec<u8>> {
        self.messages.iter().map(|m| m.labels.clone()).collect()
    }

    /// The labels of one category across all messages, `None` when the
    /// schema has no such category.
    pub fn column(&self, category: usize) -> Option<Vec<u8>> {
        if category >= self.category_names().len() {
            return None;
        }
        self.messages
            .iter()
            .map(|m| m.labels.get(category).copied())
            .collect()
    }

    /// The labels of one message paired with their category names.
    pub fn labels_of(&self, index: usize) -> Option<Vec<(&str, u8)>> {
        let message = self.messages.get(index)?;
        Some(
            self.category_names()
                .iter()
                .map(String::as_str)
                .zip(message.labels.iter().copied())
                .collect(),
        )
    }

    /// A new dataset holding the messages at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            schema: self.schema.clone(),
            messages: indices.iter().map(|&i| self.messages[i].clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let schema = CategorySchema::new(vec!["water".to_string(), "food".to_string()]);
        let messages = vec![
            LabeledMessage {
                id: 1,
                message: "need water".to_string(),
                original: None,
                genre: Genre::Direct,
                labels: vec![1, 0],
            },
            LabeledMessage {
                id: 2,
                message: "need rice".to_string(),
                original: None,
                genre: Genre::Social,
                labels: vec![0, 1],
            },
        ];
        Dataset::new(schema, messages).unwrap()
    }

    #[test]
    fn test_accessors() {
        let dataset = sample();
        assert_eq!(dataset.texts(), vec!["need water", "need rice"]);
        assert_eq!(dataset.label_matrix(), vec![vec![1, 0], vec![0, 1]]);
        assert_eq!(dataset.column(1), Some(vec![0, 1]));
        assert_eq!(dataset.column(2), None);
        assert_eq!(
            dataset.labels_of(0),
            Some(vec![("water", 1), ("food", 0)])
        );
        assert_eq!(dataset.labels_of(5), None);
    }

    #[test]
    fn test_subset_keeps_schema() {
        let dataset = sample();
        let subset = dataset.subset(&[1]);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.messages()[0].id, 2);
        assert_eq!(subset.category_names(), dataset.category_names());
    }

    #[test]
    fn test_validation() {
        let schema = CategorySchema::new(vec!["water".to_string()]);
        let message = LabeledMessage {
            id: 3,
            message: "x".to_string(),
            original: None,
            genre: Genre::News,
            labels: vec![1, 0],
        };
        assert!(matches!(
            Dataset::new(schema.clone(), vec![message.clone()]),
            Err(TriageError::Schema(_))
        ));

        let message = LabeledMessage {
            labels: vec![3],
            ..message
        };
        assert!(matches!(
            Dataset::new(schema, vec![message]),
            Err(TriageError::DataIntegrity(_))
        ));
    }
}
