//! Analyzers that combine char filters, a tokenizer and token filters.
//!
//! - [`pipeline::PipelineAnalyzer`] - a configurable chain
//! - [`message::MessageAnalyzer`] - the fixed normalization chain applied to
//!   every relief message during training and prediction

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod message;
pub mod pipeline;

pub use message::MessageAnalyzer;
pub use pipeline::PipelineAnalyzer;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}
