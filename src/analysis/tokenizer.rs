//! Tokenizer implementations for text analysis.
//!
//! Tokenizers split the char-filtered text into tokens. The message normalizer
//! uses [`treebank::TreebankWordTokenizer`], a Penn-Treebank style word
//! tokenizer that splits contractions and punctuation-adjacent tokens.
//!
//! # Examples
//!
//! ```
//! use relief_triage::analysis::tokenizer::Tokenizer;
//! use relief_triage::analysis::tokenizer::treebank::TreebankWordTokenizer;
//!
//! let tokenizer = TreebankWordTokenizer::new().unwrap();
//! let tokens: Vec<_> = tokenizer.tokenize("we cannot reach them").unwrap().collect();
//! let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, vec!["we", "can", "not", "reach", "them"]);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so one tokenizer can serve parallel
/// normalization calls.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod treebank;

pub use treebank::TreebankWordTokenizer;
