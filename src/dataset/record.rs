//! Raw input records and the cleaned labeled message.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TriageError;

/// Channel a message arrived through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Direct,
    News,
    Social,
}

impl Genre {
    /// Get the lowercase name used in the input tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Direct => "direct",
            Genre::News => "news",
            Genre::Social => "social",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Genre::Direct),
            "news" => Ok(Genre::News),
            "social" => Ok(Genre::Social),
            other => Err(TriageError::invalid_argument(format!(
                "Unknown genre '{other}'"
            ))),
        }
    }
}

/// A row of the messages table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessageRecord {
    pub id: i64,
    pub message: String,
    /// Untranslated text, when the message was translated.
    pub original: Option<String>,
    pub genre: Genre,
}

impl RawMessageRecord {
    /// Create a message record without original text.
    pub fn new<S: Into<String>>(id: i64, message: S, genre: Genre) -> Self {
        RawMessageRecord {
            id,
            message: message.into(),
            original: None,
            genre,
        }
    }

    /// Attach the untranslated original text.
    pub fn with_original<S: Into<String>>(mut self, original: S) -> Self {
        self.original = Some(original.into());
        self
    }
}

/// A row of the categories table.
///
/// `categories` is the encoded label string `name1-v1;name2-v2;...;nameN-vN`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCategoryRecord {
    pub id: i64,
    pub categories: String,
}

impl RawCategoryRecord {
    pub fn new<S: Into<String>>(id: i64, categories: S) -> Self {
        RawCategoryRecord {
            id,
            categories: categories.into(),
        }
    }
}

/// A cleaned message with one binary label per category.
///
/// `labels` is aligned with the category names of the dataset it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledMessage {
    pub id: i64,
    pub message: String,
    pub original: Option<String>,
    pub genre: Genre,
    pub labels: Vec<u8>,
}

impl LabeledMessage {
    /// Number of categories this message is labeled with (value 1).
    pub fn positive_count(&self) -> usize {
        self.labels.iter().filter(|&&v| v == 1).count()
    }
}
