//! Error types for the relief-triage library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`TriageError`] enum. The variants mirror the failure taxonomy of a
//! training run: malformed category schemas, out-of-range label values,
//! use of an unfitted component, and failed cross-validation workers.
//!
//! # Examples
//!
//! ```
//! use relief_triage::error::{Result, TriageError};
//!
//! fn decode(value: char) -> Result<u8> {
//!     match value {
//!         '0' => Ok(0),
//!         '1' => Ok(1),
//!         other => Err(TriageError::data_integrity(format!("label value {other}"))),
//!     }
//! }
//!
//! assert!(decode('2').is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for relief-triage operations.
#[derive(Error, Debug)]
pub enum TriageError {
    /// I/O errors (dataset files, model files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A category string does not parse into the expected `name-value` shape,
    /// or the category names differ between records.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A parsed label value falls outside {0, 1}.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// A component was used before it was fitted.
    #[error("Not fitted: {0}")]
    NotFitted(String),

    /// A single (candidate, fold) evaluation of the hyperparameter search failed.
    #[error("Worker evaluation failed for candidate {candidate} on fold {fold}: {source}")]
    WorkerEvaluation {
        candidate: usize,
        fold: usize,
        #[source]
        source: Box<TriageError>,
    },

    /// Analysis-related errors (tokenization, filtering, resource loading)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid argument or configuration
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Dataset or model store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// CSV decoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Thread pool construction errors
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Result type alias for operations that may fail with TriageError.
pub type Result<T> = std::result::Result<T, TriageError>;

impl TriageError {
    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        TriageError::Schema(msg.into())
    }

    /// Create a new data integrity error.
    pub fn data_integrity<S: Into<String>>(msg: S) -> Self {
        TriageError::DataIntegrity(msg.into())
    }

    /// Create a new not-fitted error.
    pub fn not_fitted<S: Into<String>>(msg: S) -> Self {
        TriageError::NotFitted(msg.into())
    }

    /// Wrap a failure of one (candidate, fold) search task.
    pub fn worker(candidate: usize, fold: usize, source: TriageError) -> Self {
        TriageError::WorkerEvaluation {
            candidate,
            fold,
            source: Box::new(source),
        }
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        TriageError::Analysis(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        TriageError::InvalidArgument(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        TriageError::Storage(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        TriageError::Serialization(msg.into())
    }

    /// Whether this error is a (possibly wrapped) not-fitted error.
    pub fn is_not_fitted(&self) -> bool {
        match self {
            TriageError::NotFitted(_) => true,
            TriageError::WorkerEvaluation { source, .. } => source.is_not_fitted(),
            _ => false,
        }
    }
}

impl From<bincode::Error> for TriageError {
    fn from(err: bincode::Error) -> Self {
        TriageError::Serialization(err.to_string())
    }
}

impl From<regex::Error> for TriageError {
    fn from(err: regex::Error) -> Self {
        TriageError::Analysis(format!("Invalid regex pattern: {err}"))
    }
}
