//! Token filter implementations for token transformation.
//!
//! Filters receive the tokenizer's stream and remove, mark or rewrite tokens.
//! The message normalizer chains them as:
//!
//! ```text
//! Tokenizer → Stop words → Keyword marker → Porter stem → Lemmatize
//! ```
//!
//! # Available Filters
//!
//! - [`stop::StopFilter`] - Removes English stop words
//! - [`keyword_marker::KeywordMarkerFilter`] - Protects placeholder tokens
//! - [`stem::StemFilter`] - Reduces words to their stem form
//! - [`lemma::LemmaFilter`] - Reduces words to a dictionary base form
//!
//! # Examples
//!
//! ```
//! use relief_triage::analysis::token::Token;
//! use relief_triage::analysis::token_filter::Filter;
//! use relief_triage::analysis::token_filter::stem::StemFilter;
//!
//! let filter = StemFilter::new();
//! let tokens = vec![Token::new("flooding", 0), Token::new("shelters", 1)];
//! let stemmed: Vec<_> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
//!
//! assert_eq!(stemmed[0].text, "flood");
//! assert_eq!(stemmed[1].text, "shelter");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
///
/// The trait requires `Send + Sync` to allow use in concurrent contexts.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod keyword_marker;
pub mod lemma;
pub mod stem;
pub mod stop;

pub use keyword_marker::KeywordMarkerFilter;
pub use lemma::{LemmaFilter, Lemmatizer, MorphyLemmatizer, PartOfSpeech};
pub use stem::{PorterStemmer, StemFilter, Stemmer};
pub use stop::StopFilter;
