//! Parallel cross-validated grid search.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::dataset::Dataset;
use crate::error::{Result, TriageError};
use crate::model::{FittedPipeline, PipelineConfig, normalize_all};
use crate::search::config::SearchConfig;
use crate::search::grid::{ParamSet, apply_params, describe};
use crate::search::kfold::{Fold, KFold};

/// Cross-validation scores of one grid candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateResult {
    /// Position of the candidate in grid order.
    pub index: usize,
    pub params: ParamSet,
    /// One score per fold, in fold order.
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

impl CandidateResult {
    /// Population standard deviation of the fold scores.
    pub fn std_score(&self) -> f64 {
        let n = self.fold_scores.len() as f64;
        let variance = self
            .fold_scores
            .iter()
            .map(|s| (s - self.mean_score).powi(2))
            .sum::<f64>()
            / n;
        variance.sqrt()
    }
}

/// The result of a grid search: every candidate's scores and the refit winner.
#[derive(Debug)]
pub struct SearchOutcome {
    pub candidates: Vec<CandidateResult>,
    /// Index into `candidates` of the selected candidate.
    pub best_index: usize,
    /// The selected candidate refit on the whole training set.
    pub best: FittedPipeline,
    pub elapsed: Duration,
}

impl SearchOutcome {
    /// The selected candidate's scores.
    pub fn best_candidate(&self) -> &CandidateResult {
        &self.candidates[self.best_index]
    }

    /// The selected candidate's parameters.
    pub fn best_params(&self) -> &ParamSet {
        &self.best_candidate().params
    }

    /// The selected candidate's mean cross-validation score.
    pub fn best_score(&self) -> f64 {
        self.best_candidate().mean_score
    }
}

/// Exhaustive search over a hyperparameter grid with K-fold cross-validation.
///
/// Every (candidate, fold) pair is an independent task run on a dedicated
/// thread pool. Each task fits the whole pipeline, vocabulary included, on
/// the fold's training rows only and scores it on the held-out rows. If any
/// task fails the search fails.
pub struct GridSearch {
    config: SearchConfig,
    thread_pool: Arc<ThreadPool>,
}

impl std::fmt::Debug for GridSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridSearch")
            .field("config", &self.config)
            .field("threads", &self.thread_pool.current_num_threads())
            .finish()
    }
}

impl GridSearch {
    /// Create a grid search, validating the grid and building its thread pool.
    pub fn new(config: SearchConfig) -> Result<Self> {
        if config.folds == 0 {
            return Err(TriageError::invalid_argument(
                "Number of folds must be at least 1",
            ));
        }
        config.grid.validate(&config.base)?;

        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(config.threads())
            .thread_name(|i| format!("grid-search-{i}"))
            .build()
            .map_err(|e| TriageError::ThreadPool(format!("Failed to create thread pool: {e}")))?;

        Ok(GridSearch {
            config,
            thread_pool: Arc::new(thread_pool),
        })
    }

    /// Get the search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search over a cleaned training dataset.
    pub fn fit(&self, dataset: &Dataset) -> Result<SearchOutcome> {
        let texts = dataset.texts();
        let corpus = self.thread_pool.install(|| normalize_all(&texts))?;
        self.fit_tokens(&corpus, &dataset.label_matrix(), dataset.category_names())
    }

    /// Search over normalized token sequences and their label rows.
    pub fn fit_tokens(
        &self,
        corpus: &[Vec<String>],
        labels: &[Vec<u8>],
        category_names: &[String],
    ) -> Result<SearchOutcome> {
        let start = Instant::now();

        if corpus.len() != labels.len() {
            return Err(TriageError::invalid_argument(format!(
                "Corpus ({}) and labels ({}) differ in length",
                corpus.len(),
                labels.len()
            )));
        }

        let candidates = self.config.grid.candidates();
        let configs = candidates
            .iter()
            .map(|params| apply_params(&self.config.base, params))
            .collect::<Result<Vec<PipelineConfig>>>()?;

        let mut kfold = KFold::new(self.config.folds);
        if let Some(seed) = self.config.shuffle_seed {
            kfold = kfold.with_shuffle(seed);
        }
        let folds = kfold.split(corpus.len())?;

        let tasks: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();
        info!(
            "Grid search: {} candidates x {} folds = {} fits on {} threads",
            candidates.len(),
            folds.len(),
            tasks.len(),
            self.thread_pool.current_num_threads()
        );

        let scores = self.thread_pool.install(|| {
            tasks
                .par_iter()
                .map(|&(c, f)| {
                    self.evaluate_task(&configs[c], &folds[f], corpus, labels, category_names)
                        .map(|score| (c, f, score))
                        .map_err(|e| TriageError::worker(c, f, e))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let mut fold_scores = vec![vec![0.0; folds.len()]; candidates.len()];
        for (c, f, score) in scores {
            fold_scores[c][f] = score;
        }

        let results: Vec<CandidateResult> = candidates
            .into_iter()
            .zip(fold_scores)
            .enumerate()
            .map(|(index, (params, fold_scores))| {
                let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
                debug!("Candidate {index} {params:?}: mean score {mean_score:.4}");
                CandidateResult {
                    index,
                    params,
                    fold_scores,
                    mean_score,
                }
            })
            .collect();

        // Strict comparison keeps the earliest candidate on ties.
        let mut best_index = 0;
        for (i, result) in results.iter().enumerate() {
            if result.mean_score > results[best_index].mean_score {
                best_index = i;
            }
        }
        info!(
            "Selected candidate {best_index} {:?} with mean score {:.4}",
            results[best_index].params, results[best_index].mean_score
        );

        let best = self
            .thread_pool
            .install(|| FittedPipeline::fit(&configs[best_index], corpus, labels, category_names))?
            .with_hyperparameters(describe(&results[best_index].params));

        Ok(SearchOutcome {
            candidates: results,
            best_index,
            best,
            elapsed: start.elapsed(),
        })
    }

    /// Fit one candidate on a fold's training rows and score its held-out rows.
    fn evaluate_task(
        &self,
        config: &PipelineConfig,
        fold: &Fold,
        corpus: &[Vec<String>],
        labels: &[Vec<u8>],
        category_names: &[String],
    ) -> Result<f64> {
        let pick_tokens = |rows: &[usize]| rows.iter().map(|&i| corpus[i].clone()).collect::<Vec<_>>();
        let pick_labels = |rows: &[usize]| rows.iter().map(|&i| labels[i].clone()).collect::<Vec<_>>();

        let pipeline = FittedPipeline::fit(
            config,
            &pick_tokens(&fold.train),
            &pick_labels(&fold.train),
            category_names,
        )?;
        let predicted = pipeline.predict_tokens(&pick_tokens(&fold.test))?;
        self.config.scoring.score(&pick_labels(&fold.test), &predicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::config::Scoring;
    use crate::search::grid::{HyperparameterGrid, ParamValue};

    fn corpus() -> (Vec<Vec<String>>, Vec<Vec<u8>>, Vec<String>) {
        let docs = [
            "need water",
            "water pump broken",
            "need food",
            "food ration",
            "water food",
            "bridg collaps",
            "need water urgent",
            "food shortag",
            "road block",
        ];
        let corpus = docs
            .iter()
            .map(|d| d.split_whitespace().map(str::to_string).collect())
            .collect();
        let labels = vec![
            vec![1, 0],
            vec![1, 0],
            vec![0, 1],
            vec![0, 1],
            vec![1, 1],
            vec![0, 0],
            vec![1, 0],
            vec![0, 1],
            vec![0, 0],
        ];
        (corpus, labels, vec!["water".to_string(), "food".to_string()])
    }

    fn config(grid: HyperparameterGrid, folds: usize) -> SearchConfig {
        SearchConfig {
            folds,
            n_jobs: Some(2),
            scoring: Scoring::CellAccuracy,
            grid,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_every_candidate_scored() {
        let (corpus, labels, names) = corpus();
        let grid = HyperparameterGrid::new()
            .with("learner", ["logistic"])
            .with("vectorizer.use_idf", [true, false])
            .with("vectorizer.sublinear_tf", [true, false]);
        let search = GridSearch::new(config(grid, 3)).unwrap();

        let outcome = search.fit_tokens(&corpus, &labels, &names).unwrap();
        assert_eq!(outcome.candidates.len(), 4);
        for (i, candidate) in outcome.candidates.iter().enumerate() {
            assert_eq!(candidate.index, i);
            assert_eq!(candidate.fold_scores.len(), 3);
            assert!(candidate.fold_scores.iter().all(|s| (0.0..=1.0).contains(s)));
            assert!(candidate.std_score() >= 0.0);
        }

        let best = outcome.best_score();
        assert!(outcome.candidates.iter().all(|c| c.mean_score <= best));
        assert!(
            outcome.candidates[..outcome.best_index]
                .iter()
                .all(|c| c.mean_score < best)
        );
        assert_eq!(
            outcome.best.metadata().hyperparameters["learner"],
            "logistic".to_string()
        );
        assert_eq!(outcome.best.metadata().training_examples, 9);
    }

    #[test]
    fn test_single_candidate_single_fold_matches_direct_fit() {
        let (corpus, labels, names) = corpus();
        let grid = HyperparameterGrid::new().with("forest.n_estimators", [7i64]);
        let search = GridSearch::new(config(grid, 1)).unwrap();
        let outcome = search.fit_tokens(&corpus, &labels, &names).unwrap();

        let direct_config = apply_params(&PipelineConfig::default(), outcome.best_params()).unwrap();
        let direct = FittedPipeline::fit(&direct_config, &corpus, &labels, &names).unwrap();

        assert_eq!(outcome.best.config(), &direct_config);
        assert_eq!(outcome.best.vocabulary().unwrap(), direct.vocabulary().unwrap());
        assert_eq!(
            outcome.best.predict_tokens(&corpus).unwrap(),
            direct.predict_tokens(&corpus).unwrap()
        );
    }

    #[test]
    fn test_failed_task_aborts_search() {
        let (corpus, labels, names) = corpus();
        let grid = HyperparameterGrid::new()
            .with("vectorizer.min_df", [ParamValue::Int(1), ParamValue::Int(4)])
            .with("vectorizer.max_df", [ParamValue::Int(2)]);
        let search = GridSearch::new(config(grid, 3)).unwrap();

        let err = search.fit_tokens(&corpus, &labels, &names).unwrap_err();
        match err {
            TriageError::WorkerEvaluation { candidate, source, .. } => {
                assert_eq!(candidate, 1);
                assert!(matches!(*source, TriageError::InvalidArgument(_)));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(GridSearch::new(config(HyperparameterGrid::new(), 0)).is_err());
        let grid = HyperparameterGrid::new().with("nope", [true]);
        assert!(GridSearch::new(config(grid, 2)).is_err());

        let (corpus, labels, names) = corpus();
        let search = GridSearch::new(config(HyperparameterGrid::new(), 20)).unwrap();
        assert!(search.fit_tokens(&corpus, &labels, &names).is_err());
    }
}
