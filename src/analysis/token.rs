//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows between the tokenizer and the token
//! filters. Besides its text it records where it came from in the input and
//! two flags filters use to coordinate: `stopped` (marked for removal) and
//! `keyword` (protected from stemming and lemmatization).
//!
//! # Examples
//!
//! ```
//! use relief_triage::analysis::token::Token;
//!
//! let token = Token::with_offsets("water", 1, 6, 11);
//! assert_eq!(token.text, "water");
//! assert_eq!(token.start_offset, 6);
//! assert!(!token.is_keyword());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A token represents a single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the original token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the analyzed text
    pub start_offset: usize,

    /// The byte offset where this token ends in the analyzed text
    pub end_offset: usize,

    /// Whether this token has been marked as stopped (removed) by a filter
    pub stopped: bool,

    /// Whether this token is protected from stemming and lemmatization
    pub keyword: bool,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            stopped: false,
            keyword: false,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            stopped: false,
            keyword: false,
        }
    }

    /// Get the length of the token text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Check if this token is stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Mark this token as a keyword.
    pub fn mark_keyword(mut self) -> Self {
        self.keyword = true;
        self
    }

    /// Check if this token is a protected keyword.
    pub fn is_keyword(&self) -> bool {
        self.keyword
    }

    /// Whether stemmers and lemmatizers should leave this token alone.
    pub fn is_frozen(&self) -> bool {
        self.stopped || self.keyword
    }

    /// Clone this token with updated text.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut token = self.clone();
        token.text = text.into();
        token
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

/// Trait for types that can produce a token stream.
pub trait IntoTokenStream {
    /// Convert this type into a token stream.
    fn into_token_stream(self) -> TokenStream;
}

impl IntoTokenStream for Vec<Token> {
    fn into_token_stream(self) -> TokenStream {
        Box::new(self.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("flood", 0);
        assert_eq!(token.text, "flood");
        assert_eq!(token.position, 0);
        assert_eq!(token.start_offset, 0);
        assert_eq!(token.end_offset, 0);
        assert!(!token.stopped);
        assert!(!token.keyword);
    }

    #[test]
    fn test_token_flags() {
        let token = Token::new("urlplaceholder", 3).mark_keyword();
        assert!(token.is_keyword());
        assert!(token.is_frozen());
        assert!(!token.is_stopped());

        let token = Token::new("the", 0).stop();
        assert!(token.is_stopped());
        assert!(token.is_frozen());
    }

    #[test]
    fn test_with_text_keeps_position() {
        let token = Token::with_offsets("flooding", 2, 10, 18);
        let stemmed = token.with_text("flood");
        assert_eq!(stemmed.text, "flood");
        assert_eq!(stemmed.position, 2);
        assert_eq!(stemmed.end_offset, 18);
    }

    #[test]
    fn test_token_stream() {
        let tokens = vec![Token::new("need", 0), Token::new("water", 1)];

        let collected: Vec<_> = tokens.into_token_stream().collect();

        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].text, "need");
        assert_eq!(format!("{}", collected[1]), "water");
    }
}
