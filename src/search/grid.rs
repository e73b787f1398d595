//! Hyperparameter grids and their mapping onto pipeline settings.
//!
//! A grid maps parameter names to candidate values. Candidates are the
//! Cartesian product taken in key order, with the last key varying fastest.
//!
//! Recognized names:
//!
//! | name | values |
//! |------|--------|
//! | `vectorizer.min_df`, `vectorizer.max_df` | integer count or fraction |
//! | `vectorizer.max_features` | integer or `"none"` |
//! | `vectorizer.use_idf`, `vectorizer.smooth_idf`, `vectorizer.sublinear_tf` | bool |
//! | `vectorizer.norm` | `"l2"` or `"raw"` |
//! | `learner` | `"logistic"` or `"random_forest"` |
//! | `logistic.learning_rate`, `logistic.l2` | number |
//! | `logistic.epochs` | integer |
//! | `forest.n_estimators`, `forest.min_samples_split`, `forest.seed` | integer |
//! | `forest.max_depth`, `forest.max_features` | integer or `"none"` |
//!
//! Parameters of the learner a candidate does not use are ignored for that
//! candidate.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::feature::{DocFrequency, Norm};
use crate::model::{ForestConfig, LearnerConfig, LogisticConfig, PipelineConfig};

/// A single hyperparameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

fn mistyped(name: &str, expected: &str, value: &ParamValue) -> TriageError {
    TriageError::invalid_argument(format!(
        "Parameter '{name}' expects {expected}, got {value:?}"
    ))
}

impl ParamValue {
    fn as_bool(&self, name: &str) -> Result<bool> {
        match self {
            ParamValue::Bool(v) => Ok(*v),
            other => Err(mistyped(name, "a bool", other)),
        }
    }

    fn as_usize(&self, name: &str) -> Result<usize> {
        match self {
            ParamValue::Int(v) if *v >= 0 => Ok(*v as usize),
            other => Err(mistyped(name, "a non-negative integer", other)),
        }
    }

    fn as_f64(&self, name: &str) -> Result<f64> {
        match self {
            ParamValue::Int(v) => Ok(*v as f64),
            ParamValue::Float(v) => Ok(*v),
            other => Err(mistyped(name, "a number", other)),
        }
    }

    fn as_optional_usize(&self, name: &str) -> Result<Option<usize>> {
        match self {
            ParamValue::Text(t) if t.eq_ignore_ascii_case("none") => Ok(None),
            ParamValue::Int(_) => self.as_usize(name).map(Some),
            other => Err(mistyped(name, "an integer or \"none\"", other)),
        }
    }

    fn as_doc_frequency(&self, name: &str) -> Result<DocFrequency> {
        match self {
            ParamValue::Int(_) => self.as_usize(name).map(DocFrequency::Count),
            ParamValue::Float(v) => Ok(DocFrequency::Fraction(*v)),
            other => Err(mistyped(name, "a count or a fraction", other)),
        }
    }
}

/// One point of a grid: parameter name to value.
pub type ParamSet = BTreeMap<String, ParamValue>;

/// Render a parameter set as text, for logs and pipeline metadata.
pub fn describe(params: &ParamSet) -> BTreeMap<String, String> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), v.to_string()))
        .collect()
}

/// An ordered mapping from parameter name to candidate values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HyperparameterGrid {
    params: BTreeMap<String, Vec<ParamValue>>,
}

impl HyperparameterGrid {
    /// An empty grid, which has exactly one (empty) candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter with its candidate values.
    pub fn with<S, I, V>(mut self, name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.insert(name, values);
        self
    }

    /// Add or replace a parameter.
    pub fn insert<S, I, V>(&mut self, name: S, values: I)
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.params
            .insert(name.into(), values.into_iter().map(Into::into).collect());
    }

    /// Parameter names in key order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Candidate values of a parameter.
    pub fn values(&self, name: &str) -> Option<&[ParamValue]> {
        self.params.get(name).map(Vec::as_slice)
    }

    /// Number of candidates in the Cartesian product.
    pub fn n_candidates(&self) -> usize {
        self.params.values().map(Vec::len).product()
    }

    /// Enumerate every candidate.
    pub fn candidates(&self) -> Vec<ParamSet> {
        let mut candidates = vec![ParamSet::new()];
        for (name, values) in &self.params {
            candidates = candidates
                .into_iter()
                .flat_map(|partial| {
                    values.iter().map(move |value| {
                        let mut next = partial.clone();
                        next.insert(name.clone(), value.clone());
                        next
                    })
                })
                .collect();
        }
        candidates
    }

    /// Check every parameter name and value against a base configuration.
    pub fn validate(&self, base: &PipelineConfig) -> Result<()> {
        if let Some((name, _)) = self.params.iter().find(|(_, v)| v.is_empty()) {
            return Err(TriageError::invalid_argument(format!(
                "Parameter '{name}' has no candidate values"
            )));
        }
        for (name, values) in &self.params {
            for value in values {
                let mut single = ParamSet::new();
                single.insert(name.clone(), value.clone());
                let config = apply_params(base, &single)?;
                config.vectorizer.validate()?;
                match &config.learner {
                    LearnerConfig::Logistic(c) => c.validate()?,
                    LearnerConfig::RandomForest(c) => c.validate()?,
                }
            }
        }
        Ok(())
    }
}

/// Build the pipeline configuration a candidate describes.
pub fn apply_params(base: &PipelineConfig, params: &ParamSet) -> Result<PipelineConfig> {
    let mut config = base.clone();

    // The learner kind decides which learner parameters apply.
    if let Some(value) = params.get("learner") {
        config.learner = match value {
            ParamValue::Text(t) if t == "logistic" => match &base.learner {
                LearnerConfig::Logistic(c) => LearnerConfig::Logistic(c.clone()),
                _ => LearnerConfig::Logistic(LogisticConfig::default()),
            },
            ParamValue::Text(t) if t == "random_forest" => match &base.learner {
                LearnerConfig::RandomForest(c) => LearnerConfig::RandomForest(c.clone()),
                _ => LearnerConfig::RandomForest(ForestConfig::default()),
            },
            other => return Err(mistyped("learner", "\"logistic\" or \"random_forest\"", other)),
        };
    }

    for (name, value) in params {
        let name = name.as_str();
        let vectorizer = &mut config.vectorizer;
        match name {
            "learner" => {}
            "vectorizer.min_df" => vectorizer.min_df = value.as_doc_frequency(name)?,
            "vectorizer.max_df" => vectorizer.max_df = value.as_doc_frequency(name)?,
            "vectorizer.max_features" => vectorizer.max_features = value.as_optional_usize(name)?,
            "vectorizer.use_idf" => vectorizer.use_idf = value.as_bool(name)?,
            "vectorizer.smooth_idf" => vectorizer.smooth_idf = value.as_bool(name)?,
            "vectorizer.sublinear_tf" => vectorizer.sublinear_tf = value.as_bool(name)?,
            "vectorizer.norm" => {
                vectorizer.norm = match value {
                    ParamValue::Text(t) if t == "l2" => Norm::L2,
                    ParamValue::Text(t) if t == "raw" => Norm::Raw,
                    other => return Err(mistyped(name, "\"l2\" or \"raw\"", other)),
                }
            }
            _ if name.starts_with("logistic.") => {
                let mut scratch = LogisticConfig::default();
                let target = match &mut config.learner {
                    LearnerConfig::Logistic(c) => c,
                    LearnerConfig::RandomForest(_) => &mut scratch,
                };
                match name {
                    "logistic.learning_rate" => target.learning_rate = value.as_f64(name)?,
                    "logistic.epochs" => target.epochs = value.as_usize(name)?,
                    "logistic.l2" => target.l2 = value.as_f64(name)?,
                    _ => return Err(unknown(name)),
                }
            }
            _ if name.starts_with("forest.") => {
                let mut scratch = ForestConfig::default();
                let target = match &mut config.learner {
                    LearnerConfig::RandomForest(c) => c,
                    LearnerConfig::Logistic(_) => &mut scratch,
                };
                match name {
                    "forest.n_estimators" => target.n_estimators = value.as_usize(name)?,
                    "forest.max_depth" => target.max_depth = value.as_optional_usize(name)?,
                    "forest.min_samples_split" => {
                        target.min_samples_split = value.as_usize(name)?
                    }
                    "forest.max_features" => target.max_features = value.as_optional_usize(name)?,
                    "forest.seed" => target.seed = value.as_usize(name)? as u64,
                    _ => return Err(unknown(name)),
                }
            }
            _ => return Err(unknown(name)),
        }
    }

    Ok(config)
}

fn unknown(name: &str) -> TriageError {
    TriageError::invalid_argument(format!("Unknown hyperparameter '{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cartesian_product_order() {
        let grid = HyperparameterGrid::new()
            .with("vectorizer.use_idf", [true, false])
            .with("forest.n_estimators", [10i64, 20, 30]);

        assert_eq!(grid.n_candidates(), 6);
        let candidates = grid.candidates();
        assert_eq!(candidates.len(), 6);

        // Keys sort as forest.* < vectorizer.*; the last key varies fastest.
        assert_eq!(candidates[0]["forest.n_estimators"], ParamValue::Int(10));
        assert_eq!(candidates[0]["vectorizer.use_idf"], ParamValue::Bool(true));
        assert_eq!(candidates[1]["vectorizer.use_idf"], ParamValue::Bool(false));
        assert_eq!(candidates[2]["forest.n_estimators"], ParamValue::Int(20));
    }

    #[test]
    fn test_empty_grid_has_one_candidate() {
        let grid = HyperparameterGrid::new();
        assert_eq!(grid.n_candidates(), 1);
        assert_eq!(grid.candidates(), vec![ParamSet::new()]);
    }

    #[test]
    fn test_apply_params() {
        let grid = HyperparameterGrid::new()
            .with("learner", ["logistic"])
            .with("logistic.epochs", [5i64])
            .with("vectorizer.max_df", [0.9])
            .with("vectorizer.min_df", [2i64])
            .with("vectorizer.max_features", ["none"]);
        let params = &grid.candidates()[0];

        let config = apply_params(&PipelineConfig::default(), params).unwrap();
        assert_eq!(config.vectorizer.max_df, DocFrequency::Fraction(0.9));
        assert_eq!(config.vectorizer.min_df, DocFrequency::Count(2));
        assert_eq!(config.vectorizer.max_features, None);
        match config.learner {
            LearnerConfig::Logistic(c) => assert_eq!(c.epochs, 5),
            other => panic!("unexpected learner {other:?}"),
        }
    }

    #[test]
    fn test_inactive_learner_params_ignored() {
        let mut params = ParamSet::new();
        params.insert("forest.n_estimators".to_string(), ParamValue::Int(99));
        params.insert("learner".to_string(), ParamValue::from("logistic"));

        let config = apply_params(&PipelineConfig::default(), &params).unwrap();
        assert_eq!(config.learner, LearnerConfig::Logistic(LogisticConfig::default()));
    }

    #[test]
    fn test_invalid_params() {
        let base = PipelineConfig::default();
        let bad = [
            HyperparameterGrid::new().with("vectorizer.colour", [true]),
            HyperparameterGrid::new().with("vectorizer.use_idf", [1i64]),
            HyperparameterGrid::new().with("forest.n_estimators", [0i64]),
            HyperparameterGrid::new().with("learner", ["svm"]),
            HyperparameterGrid::new().with("forest.max_depth", Vec::<i64>::new()),
        ];
        for grid in bad {
            assert!(matches!(grid.validate(&base), Err(TriageError::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_grid_from_json() {
        let json = r#"{"learner": ["logistic", "random_forest"], "vectorizer.max_df": [1, 0.5], "vectorizer.use_idf": [true]}"#;
        let grid: HyperparameterGrid = serde_json::from_str(json).unwrap();
        assert_eq!(grid.n_candidates(), 4);
        assert_eq!(
            grid.values("vectorizer.max_df").unwrap(),
            &[ParamValue::Int(1), ParamValue::Float(0.5)]
        );
        assert!(grid.validate(&PipelineConfig::default()).is_ok());
    }
}
