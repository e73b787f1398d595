//! Keyword marker filter.

use std::collections::HashSet;
use std::sync::Arc;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that marks listed words as keywords so later stemming and
/// lemmatization filters leave them untouched.
#[derive(Clone, Debug)]
pub struct KeywordMarkerFilter {
    keywords: Arc<HashSet<String>>,
}

impl KeywordMarkerFilter {
    /// Create a keyword marker from a list of protected words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeywordMarkerFilter {
            keywords: Arc::new(words.into_iter().map(Into::into).collect()),
        }
    }

    /// Check if a word is protected.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }
}

impl Filter for KeywordMarkerFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let marked: Vec<Token> = tokens
            .map(|token| {
                if !token.is_stopped() && self.is_keyword(&token.text) {
                    token.mark_keyword()
                } else {
                    token
                }
            })
            .collect();

        Ok(Box::new(marked.into_iter()))
    }

    fn name(&self) -> &'static str {
        "keyword_marker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_listed_words() {
        let filter = KeywordMarkerFilter::from_words(["urlplaceholder"]);
        let tokens = vec![Token::new("see", 0), Token::new("urlplaceholder", 1)];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert!(!result[0].is_keyword());
        assert!(result[1].is_keyword());
        assert_eq!(filter.name(), "keyword_marker");
    }
}
