//! The top-level training run.
//!
//! A run cleans the raw records, splits off a held-out test partition,
//! searches the hyperparameter grid on the training partition only and
//! evaluates the refit winner on the test partition.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::dataset::{
    CleaningStats, Dataset, DatasetCleaner, LabelPolicy, RawCategoryRecord, RawMessageRecord,
    load_categories_csv, load_messages_csv, train_test_split,
};
use crate::error::{Result, TriageError};
use crate::evaluation::{Report, evaluate_dataset};
use crate::model::FittedPipeline;
use crate::search::{GridSearch, SearchConfig, SearchOutcome};

/// Settings for a whole training run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of the cleaned dataset held out for evaluation.
    pub test_size: f64,
    /// Seed of the train/test shuffle.
    pub seed: u64,
    pub label_policy: LabelPolicy,
    pub search: SearchConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            test_size: 0.2,
            seed: 42,
            label_policy: LabelPolicy::default(),
            search: SearchConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TrainingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Check the settings that can be checked without data.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(TriageError::invalid_argument(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.search.folds == 0 {
            return Err(TriageError::invalid_argument(
                "Number of folds must be at least 1",
            ));
        }
        self.search.grid.validate(&self.search.base)
    }
}

/// Everything a training run produced.
#[derive(Debug)]
pub struct TrainingRun {
    pub stats: CleaningStats,
    pub train: Dataset,
    pub test: Dataset,
    pub outcome: SearchOutcome,
    /// Evaluation of the selected pipeline on `test`.
    pub report: Report,
}

impl TrainingRun {
    /// The selected, refit pipeline.
    pub fn pipeline(&self) -> &FittedPipeline {
        &self.outcome.best
    }

    /// Take ownership of the selected pipeline.
    pub fn into_pipeline(self) -> FittedPipeline {
        self.outcome.best
    }
}

/// Train and evaluate a pipeline from raw records.
pub fn train(
    messages: &[RawMessageRecord],
    categories: &[RawCategoryRecord],
    config: &TrainingConfig,
) -> Result<TrainingRun> {
    config.validate()?;
    let cleaner = DatasetCleaner::new().with_policy(config.label_policy);
    let (dataset, stats) = cleaner.clean_with_stats(messages, categories)?;
    let (train, test, outcome, report) = run(&dataset, config)?;
    Ok(TrainingRun {
        stats,
        train,
        test,
        outcome,
        report,
    })
}

/// Train and evaluate a pipeline from the two CSV tables.
pub fn train_from_csv<P: AsRef<Path>, Q: AsRef<Path>>(
    messages_path: P,
    categories_path: Q,
    config: &TrainingConfig,
) -> Result<TrainingRun> {
    let messages = load_messages_csv(messages_path)?;
    let categories = load_categories_csv(categories_path)?;
    train(&messages, &categories, config)
}

/// Train and evaluate a pipeline on an already cleaned dataset.
pub fn train_dataset(dataset: &Dataset, config: &TrainingConfig) -> Result<TrainingRun> {
    config.validate()?;
    let (train, test, outcome, report) = run(dataset, config)?;
    Ok(TrainingRun {
        stats: CleaningStats {
            joined: dataset.len(),
            ..CleaningStats::default()
        },
        train,
        test,
        outcome,
        report,
    })
}

fn run(
    dataset: &Dataset,
    config: &TrainingConfig,
) -> Result<(Dataset, Dataset, SearchOutcome, Report)> {
    let (train, test) = train_test_split(dataset, config.test_size, config.seed)?;
    info!(
        "Training on {} messages, holding out {} across {} categories",
        train.len(),
        test.len(),
        dataset.schema().len()
    );

    let search = GridSearch::new(config.search.clone())?;
    let outcome = search.fit(&train)?;
    info!(
        "Search finished in {:.2?}: best mean score {:.4}",
        outcome.elapsed,
        outcome.best_score()
    );

    let report = evaluate_dataset(&outcome.best, &test)?;
    Ok((train, test, outcome, report))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::io::Write;

    use super::*;
    use crate::dataset::Genre;
    use crate::search::HyperparameterGrid;

    fn records() -> (Vec<RawMessageRecord>, Vec<RawCategoryRecord>) {
        let texts = [
            ("we need clean water", "1;0"),
            ("no drinking water here", "1;0"),
            ("water supply is cut", "1;0"),
            ("please send water", "1;0"),
            ("we are hungry and need food", "0;1"),
            ("food supplies ran out", "0;1"),
            ("children need food", "0;1"),
            ("send rice and food", "0;1"),
            ("need water and food", "1;1"),
            ("no food no water", "1;1"),
            ("the road is blocked", "0;0"),
            ("bridge collapsed downtown", "0;0"),
        ];
        let mut messages = Vec::new();
        let mut categories = Vec::new();
        for (i, (text, values)) in texts.iter().enumerate() {
            let id = i as i64 + 1;
            messages.push(RawMessageRecord::new(id, *text, Genre::Direct));
            let (water, food) = values.split_once(';').unwrap();
            categories.push(RawCategoryRecord::new(
                id,
                format!("water-{water};food-{food}"),
            ));
        }
        (messages, categories)
    }

    fn config() -> TrainingConfig {
        let mut config = TrainingConfig {
            test_size: 0.25,
            seed: 7,
            ..TrainingConfig::default()
        };
        config.search.folds = 2;
        config.search.n_jobs = Some(2);
        config.search.grid = HyperparameterGrid::new()
            .with("learner", ["logistic"])
            .with("vectorizer.sublinear_tf", [false, true]);
        config
    }

    #[test]
    fn test_train_run() {
        let (messages, categories) = records();
        let run = train(&messages, &categories, &config()).unwrap();

        assert_eq!(run.stats.joined, 12);
        assert_eq!(run.train.len(), 9);
        assert_eq!(run.test.len(), 3);

        let train_ids: HashSet<i64> = run.train.messages().iter().map(|m| m.id).collect();
        assert!(run.test.messages().iter().all(|m| !train_ids.contains(&m.id)));

        assert_eq!(run.outcome.candidates.len(), 2);
        assert_eq!(run.report.categories.len(), 2);
        assert_eq!(run.report.n_samples, 3);
        assert!((0.0..=1.0).contains(&run.report.accuracy));

        let pipeline = run.into_pipeline();
        assert_eq!(pipeline.metadata().training_examples, 9);
        assert_eq!(pipeline.category_names(), ["water", "food"]);
    }

    #[test]
    fn test_vocabulary_comes_from_training_rows() {
        let (messages, categories) = records();
        let run = train(&messages, &categories, &config()).unwrap();
        let vocabulary = run.pipeline().vocabulary().unwrap();

        let train_corpus = crate::model::normalize_all(&run.train.texts()).unwrap();
        let train_tokens: HashSet<&String> = train_corpus.iter().flatten().collect();
        assert!(vocabulary.terms().iter().all(|t| train_tokens.contains(t)));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "test_size": 0.3,
                "label_policy": "clamp",
                "search": {{
                    "folds": 4,
                    "scoring": "macro_f1",
                    "grid": {{ "learner": ["logistic", "random_forest"], "forest.max_depth": [4, "none"] }}
                }}
            }}"#
        )
        .unwrap();

        let config = TrainingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.test_size, 0.3);
        assert_eq!(config.seed, 42);
        assert_eq!(config.label_policy, LabelPolicy::Clamp);
        assert_eq!(config.search.folds, 4);
        assert_eq!(config.search.grid.n_candidates(), 4);
    }

    #[test]
    fn test_invalid_config() {
        assert!(TrainingConfig::from_json(r#"{"test_size": 1.5}"#).is_err());
        assert!(TrainingConfig::from_json(r#"{"search": {"grid": {"bogus": [1]}}}"#).is_err());
        assert!(TrainingConfig::from_json("not json").is_err());
    }
}
