//! Lemmatizing token filter.
//!
//! [`LemmaFilter`] runs a [`Lemmatizer`] over every token once per configured
//! part of speech, feeding each pass the previous pass's output. The default
//! chain is noun then verb.
//!
//! # Examples
//!
//! ```
//! use relief_triage::analysis::token::Token;
//! use relief_triage::analysis::token_filter::Filter;
//! use relief_triage::analysis::token_filter::lemma::LemmaFilter;
//!
//! let filter = LemmaFilter::new();
//! let tokens = vec![Token::new("women", 0), Token::new("went", 1)];
//! let lemmas: Vec<_> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
//!
//! assert_eq!(lemmas[0].text, "woman");
//! assert_eq!(lemmas[1].text, "go");
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

pub mod lexicon;
pub mod morphy;

pub use lexicon::{ExceptionTable, Lexicon, PartOfSpeech};
pub use morphy::MorphyLemmatizer;

/// Trait for lemmatization algorithms.
pub trait Lemmatizer: Send + Sync {
    /// Reduce `word` to its base form for the given part of speech.
    fn lemmatize(&self, word: &str, pos: PartOfSpeech) -> String;

    /// Get the name of this lemmatizer.
    fn name(&self) -> &'static str;
}

/// Filter that replaces each token with its lemma.
///
/// Stopped and keyword tokens pass through untouched.
pub struct LemmaFilter {
    lemmatizer: Box<dyn Lemmatizer>,
    passes: Vec<PartOfSpeech>,
}

impl std::fmt::Debug for LemmaFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemmaFilter")
            .field("lemmatizer", &self.lemmatizer.name())
            .field("passes", &self.passes)
            .finish()
    }
}

impl LemmaFilter {
    /// Create a filter running the morphy lemmatizer as noun, then verb.
    pub fn new() -> Self {
        Self::with_lemmatizer(
            Box::new(MorphyLemmatizer::new()),
            vec![PartOfSpeech::Noun, PartOfSpeech::Verb],
        )
    }

    /// Create a filter with a custom lemmatizer and pass order.
    pub fn with_lemmatizer(lemmatizer: Box<dyn Lemmatizer>, passes: Vec<PartOfSpeech>) -> Self {
        LemmaFilter { lemmatizer, passes }
    }

    /// Apply every pass to a single word.
    pub fn lemmatize(&self, word: &str) -> String {
        self.passes
            .iter()
            .fold(word.to_string(), |current, pos| {
                self.lemmatizer.lemmatize(&current, *pos)
            })
    }
}

impl Default for LemmaFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for LemmaFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_frozen() {
                    token
                } else {
                    let lemma = self.lemmatize(&token.text);
                    token.with_text(lemma)
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lemma"
    }
}
