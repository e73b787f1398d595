//! Merging and cleaning of raw message and category records.
//!
//! Records are inner-joined on `id` in message-table order (a message id
//! without a category row, or the reverse, is dropped). The category schema
//! comes from the first joined row and every other row must match it.
//! Finally rows sharing the same `(id, message)` pair are collapsed to the
//! first one seen.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use crate::dataset::Dataset;
use crate::dataset::categories::{CategorySchema, LabelPolicy};
use crate::dataset::record::{LabeledMessage, RawCategoryRecord, RawMessageRecord};
use crate::error::{Result, TriageError};

/// Counts reported by a cleaning run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleaningStats {
    /// Rows produced by the join.
    pub joined: usize,
    /// Message ids with no category row.
    pub unmatched_messages: usize,
    /// Category ids with no message row.
    pub unmatched_categories: usize,
    /// Rows dropped under [`LabelPolicy::Drop`].
    pub dropped_labels: usize,
    /// Rows removed as `(id, message)` duplicates.
    pub duplicates: usize,
}

/// Builds a [`Dataset`] from raw records.
#[derive(Clone, Debug, Default)]
pub struct DatasetCleaner {
    policy: LabelPolicy,
}

impl DatasetCleaner {
    /// Create a cleaner with the default [`LabelPolicy::Reject`] policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how out-of-range label values are handled.
    pub fn with_policy(mut self, policy: LabelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get the label policy.
    pub fn policy(&self) -> LabelPolicy {
        self.policy
    }

    /// Clean the records into a dataset.
    pub fn clean(
        &self,
        messages: &[RawMessageRecord],
        categories: &[RawCategoryRecord],
    ) -> Result<Dataset> {
        self.clean_with_stats(messages, categories)
            .map(|(dataset, _)| dataset)
    }

    /// Clean the records, also returning what was dropped along the way.
    pub fn clean_with_stats(
        &self,
        messages: &[RawMessageRecord],
        categories: &[RawCategoryRecord],
    ) -> Result<(Dataset, CleaningStats)> {
        let mut stats = CleaningStats::default();

        let mut by_id: HashMap<i64, Vec<&RawCategoryRecord>> = HashMap::new();
        for record in categories {
            by_id.entry(record.id).or_default().push(record);
        }

        let message_ids: HashSet<i64> = messages.iter().map(|m| m.id).collect();
        stats.unmatched_categories = by_id
            .iter()
            .filter(|(id, _)| !message_ids.contains(id))
            .map(|(_, rows)| rows.len())
            .sum();

        let first_row = messages
            .iter()
            .find_map(|m| by_id.get(&m.id).and_then(|rows| rows.first()));
        let schema = match first_row {
            Some(row) => CategorySchema::from_encoded(&row.categories)
                .map_err(|e| Self::with_id(e, row.id))?,
            None => {
                return Err(TriageError::schema(
                    "No message matched a category record; cannot establish a schema",
                ));
            }
        };
        debug!("Category schema has {} categories", schema.len());

        let mut seen: HashSet<(i64, &str)> = HashSet::new();
        let mut cleaned = Vec::new();

        for message in messages {
            let Some(rows) = by_id.get(&message.id) else {
                stats.unmatched_messages += 1;
                continue;
            };

            for row in rows {
                stats.joined += 1;

                let labels = schema
                    .decode(&row.categories, self.policy)
                    .map_err(|e| Self::with_id(e, message.id))?;
                let Some(labels) = labels else {
                    debug!("Dropping message {} with out-of-range labels", message.id);
                    stats.dropped_labels += 1;
                    continue;
                };

                if !seen.insert((message.id, message.message.as_str())) {
                    stats.duplicates += 1;
                    continue;
                }

                cleaned.push(LabeledMessage {
                    id: message.id,
                    message: message.message.clone(),
                    original: message.original.clone(),
                    genre: message.genre,
                    labels,
                });
            }
        }

        let distinct_ids: HashSet<i64> = cleaned.iter().map(|m| m.id).collect();
        if distinct_ids.len() != cleaned.len() {
            warn!(
                "{} ids carry more than one distinct message after deduplication",
                cleaned.len() - distinct_ids.len()
            );
        }

        info!(
            "Cleaned {} messages ({} joined, {} duplicates, {} dropped, {} unmatched messages, {} unmatched categories)",
            cleaned.len(),
            stats.joined,
            stats.duplicates,
            stats.dropped_labels,
            stats.unmatched_messages,
            stats.unmatched_categories
        );

        Ok((Dataset::new(schema, cleaned)?, stats))
    }

    fn with_id(error: TriageError, id: i64) -> TriageError {
        match error {
            TriageError::Schema(msg) => TriageError::schema(format!("Message {id}: {msg}")),
            TriageError::DataIntegrity(msg) => {
                TriageError::data_integrity(format!("Message {id}: {msg}"))
            }
            other => other,
        }
    }
}

/// Clean records with the default policy.
pub fn clean(messages: &[RawMessageRecord], categories: &[RawCategoryRecord]) -> Result<Dataset> {
    DatasetCleaner::new().clean(messages, categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::record::Genre;

    fn message(id: i64, text: &str) -> RawMessageRecord {
        RawMessageRecord::new(id, text, Genre::Direct)
    }

    fn category(id: i64, raw: &str) -> RawCategoryRecord {
        RawCategoryRecord::new(id, raw)
    }

    #[test]
    fn test_inner_join_drops_unmatched_ids() {
        let messages = vec![message(1, "water"), message(2, "food"), message(3, "tents")];
        let categories = vec![
            category(3, "water-0;food-0"),
            category(1, "water-1;food-0"),
            category(9, "water-0;food-1"),
        ];

        let (dataset, stats) = DatasetCleaner::new()
            .clean_with_stats(&messages, &categories)
            .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.messages()[0].id, 1);
        assert_eq!(dataset.messages()[1].id, 3);
        assert_eq!(dataset.messages()[0].labels, vec![1, 0]);
        assert_eq!(stats.unmatched_messages, 1);
        assert_eq!(stats.unmatched_categories, 1);
    }

    #[test]
    fn test_duplicates_keep_first() {
        let messages = vec![message(7, "help"), message(7, "help"), message(8, "help")];
        let categories = vec![category(7, "water-1;food-0"), category(8, "water-0;food-1")];

        let (dataset, stats) = DatasetCleaner::new()
            .clean_with_stats(&messages, &categories)
            .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.messages().iter().filter(|m| m.id == 7).count(), 1);
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn test_schema_from_first_record() {
        let messages = vec![message(1, "a"), message(2, "b")];
        let categories = vec![category(1, "water-1;food-0"), category(2, "food-1;water-0")];

        let err = clean(&messages, &categories).unwrap_err();
        assert!(matches!(err, TriageError::Schema(_)));
        assert!(err.to_string().contains("Message 2"));
    }

    #[test]
    fn test_label_policies() {
        let messages = vec![message(1, "a"), message(2, "b")];
        let categories = vec![category(1, "water-1;food-0"), category(2, "water-2;food-0")];

        let err = clean(&messages, &categories).unwrap_err();
        assert!(matches!(err, TriageError::DataIntegrity(_)));

        let clamped = DatasetCleaner::new()
            .with_policy(LabelPolicy::Clamp)
            .clean(&messages, &categories)
            .unwrap();
        assert_eq!(clamped.messages()[1].labels, vec![1, 0]);

        let (dropped, stats) = DatasetCleaner::new()
            .with_policy(LabelPolicy::Drop)
            .clean_with_stats(&messages, &categories)
            .unwrap();
        assert_eq!(dropped.len(), 1);
        assert_eq!(stats.dropped_labels, 1);
    }

    #[test]
    fn test_no_match_is_schema_error() {
        let err = clean(&[message(1, "a")], &[category(2, "water-1")]).unwrap_err();
        assert!(matches!(err, TriageError::Schema(_)));
    }
}
