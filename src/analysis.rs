//! Text analysis for relief messages.
//!
//! Raw message text flows through char filters, a tokenizer and a chain of
//! token filters, the same layering a search engine analyzer uses:
//!
//! ```text
//! Text → Lowercase → URL mask → Punctuation strip → Word tokenizer
//!      → Stop words → Keyword marker → Porter stem → Lemmatize (noun, verb)
//! ```
//!
//! The composed pipeline is exposed as [`analyzer::MessageAnalyzer`] and the
//! process-wide [`normalize`] function.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::message::{URL_PLACEHOLDER, normalize};
