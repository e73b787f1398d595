//! The message normalizer.
//!
//! Every relief message goes through the same fixed chain, in this order:
//!
//! 1. lowercase the whole string
//! 2. replace each `http`/`https` URL with the literal token `urlplaceholder`
//! 3. replace every character that is not an ASCII letter or digit with a space
//! 4. split into words with the Treebank tokenizer
//! 5. drop English stop words
//! 6. Porter-stem each word
//! 7. lemmatize each stem as a noun, then the result as a verb
//!
//! The placeholder is marked as a keyword after stop-word removal so steps 6
//! and 7 leave it intact. Normalization is pure: the analyzer holds only
//! immutable rule tables and the output depends on nothing but the input.
//!
//! # Examples
//!
//! ```
//! use relief_triage::analysis::normalize;
//!
//! let tokens = normalize("We need WATER and tents at http://relief.org/camp!").unwrap();
//! assert_eq!(tokens, vec!["need", "water", "tent", "urlplaceholder"]);
//! ```

use std::sync::{Arc, LazyLock};

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::char_filter::{LowercaseCharFilter, PatternReplaceCharFilter};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{KeywordMarkerFilter, LemmaFilter, StemFilter, StopFilter};
use crate::analysis::tokenizer::TreebankWordTokenizer;
use crate::error::{Result, TriageError};

/// Literal token every URL is replaced with.
pub const URL_PLACEHOLDER: &str = "urlplaceholder";

static DEFAULT_ANALYZER: LazyLock<std::result::Result<MessageAnalyzer, String>> =
    LazyLock::new(|| MessageAnalyzer::new().map_err(|e| e.to_string()));

/// Normalize a raw message into its canonical token sequence.
///
/// Uses a process-wide analyzer built on first use and shared read-only
/// afterwards, so concurrent callers never rebuild the rule tables.
pub fn normalize(text: &str) -> Result<Vec<String>> {
    match &*DEFAULT_ANALYZER {
        Ok(analyzer) => analyzer.normalize(text),
        Err(message) => Err(TriageError::analysis(message.clone())),
    }
}

/// Analyzer implementing the relief message normalization chain.
#[derive(Clone, Debug)]
pub struct MessageAnalyzer {
    inner: PipelineAnalyzer,
}

impl MessageAnalyzer {
    /// Build the analyzer, compiling its patterns.
    pub fn new() -> Result<Self> {
        let tokenizer = Arc::new(TreebankWordTokenizer::new()?);
        let inner = PipelineAnalyzer::new(tokenizer)
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::url_masker(
                URL_PLACEHOLDER,
            )?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::punctuation_stripper()?))
            .add_filter(Arc::new(StopFilter::new()))
            .add_filter(Arc::new(KeywordMarkerFilter::from_words([URL_PLACEHOLDER])))
            .add_filter(Arc::new(StemFilter::new()))
            .add_filter(Arc::new(LemmaFilter::new()))
            .with_name("message");

        Ok(MessageAnalyzer { inner })
    }

    /// Get the underlying pipeline.
    pub fn inner(&self) -> &PipelineAnalyzer {
        &self.inner
    }

    /// Normalize text into token strings.
    pub fn normalize(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}

impl Analyzer for MessageAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "message"
    }
}
