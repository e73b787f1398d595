//! Token vocabulary with deterministic index assignment.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A mapping from token to feature index.
///
/// Terms are stored sorted, so a term's index is its rank in lexicographic
/// order. The same set of terms always yields the same indices, whatever
/// order the corpus was read in.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    /// Sorted terms.
    terms: Vec<String>,
    /// Term to index in `terms`.
    index: AHashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from any collection of terms. Duplicates are merged.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        terms.sort();
        terms.dedup();

        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        Vocabulary { terms, index }
    }

    /// Index of a term.
    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Check whether a term is in the vocabulary.
    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    /// The term at an index.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    /// All terms in index order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        Vocabulary::from_terms(terms)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_indices() {
        let vocab = Vocabulary::from_terms(["water", "food", "water", "aid"]);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.terms(), &["aid", "food", "water"]);
        assert_eq!(vocab.get("food"), Some(1));
        assert_eq!(vocab.term(2), Some("water"));
        assert_eq!(vocab.get("tent"), None);
        assert!(!vocab.contains("tent"));
    }

    #[test]
    fn test_order_independent() {
        let a = Vocabulary::from_terms(["b", "a", "c"]);
        let b = Vocabulary::from_terms(["c", "b", "a"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_rebuilds_index() {
        let vocab = Vocabulary::from_terms(["need", "help"]);
        let json = serde_json::to_string(&vocab).unwrap();
        assert_eq!(json, r#"["help","need"]"#);

        let restored: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.get("need"), Some(1));
    }
}
