//! Penn-Treebank style word tokenizer.
//!
//! The text is rewritten by an ordered list of regex rules that pad
//! punctuation, quotes and contractions with spaces, and the result is split
//! on whitespace. Rules run in this order: starting quotes, punctuation,
//! brackets, double dashes, ending quotes and clitics, then the fixed
//! contraction splits (`cannot` → `can not`, `gonna` → `gon na`, ...).

use std::sync::Arc;

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A single rewrite rule: every match of `pattern` is replaced by `replacement`.
#[derive(Clone, Debug)]
struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Result<Self> {
        Ok(Rule {
            pattern: Regex::new(pattern)?,
            replacement,
        })
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement)
            .into_owned()
    }
}

#[derive(Debug)]
struct RuleSet {
    starting_quotes: Vec<Rule>,
    punctuation: Vec<Rule>,
    brackets: Rule,
    double_dashes: Rule,
    ending_quotes: Vec<Rule>,
    contractions: Vec<Rule>,
}

impl RuleSet {
    fn build() -> Result<Self> {
        Ok(RuleSet {
            starting_quotes: vec![
                Rule::new(r"([«“‘„]|[`]+)", " ${1} ")?,
                Rule::new(r#"^""#, "``")?,
                Rule::new(r"(``)", " ${1} ")?,
                Rule::new(r#"([ (\[{<])("|'{2})"#, "${1} `` ")?,
            ],
            punctuation: vec![
                Rule::new(r#"([^.])(\.)([\])}>"']*)\s*$"#, "${1} ${2} ${3} ")?,
                Rule::new(r"([:,])([^\d])", " ${1} ${2}")?,
                Rule::new(r"([:,])$", " ${1} ")?,
                Rule::new(r"\.{2,}", " ${0} ")?,
                Rule::new(r"[;@#$%&]", " ${0} ")?,
                Rule::new(r"[?!]", " ${0} ")?,
                Rule::new(r"([^'])' ", "${1} ' ")?,
                Rule::new(r"[*]", " ${0} ")?,
            ],
            brackets: Rule::new(r"[\]\[(){}<>]", " ${0} ")?,
            double_dashes: Rule::new(r"--", " -- ")?,
            ending_quotes: vec![
                Rule::new(r"([»”’])", " ${1} ")?,
                Rule::new(r"''", " '' ")?,
                Rule::new(r#"""#, " '' ")?,
                Rule::new(r"([^' ])('[sS]|'[mM]|'[dD]|') ", "${1} ${2} ")?,
                Rule::new(r"([^' ])('ll|'LL|'re|'RE|'ve|'VE|n't|N'T) ", "${1} ${2} ")?,
            ],
            contractions: vec![
                Rule::new(r"(?i)\b(can)(not)\b", " ${1} ${2} ")?,
                Rule::new(r"(?i)\b(d)('ye)\b", " ${1} ${2} ")?,
                Rule::new(r"(?i)\b(gim)(me)\b", " ${1} ${2} ")?,
                Rule::new(r"(?i)\b(gon)(na)\b", " ${1} ${2} ")?,
                Rule::new(r"(?i)\b(got)(ta)\b", " ${1} ${2} ")?,
                Rule::new(r"(?i)\b(lem)(me)\b", " ${1} ${2} ")?,
                Rule::new(r"(?i)\b(more)('n)\b", " ${1} ${2} ")?,
                Rule::new(r"(?i)\b(wan)(na)\s", " ${1} ${2} ")?,
                Rule::new(r"(?i) ('t)(is)\b", " ${1} ${2} ")?,
                Rule::new(r"(?i) ('t)(was)\b", " ${1} ${2} ")?,
            ],
        })
    }

    fn rewrite(&self, text: &str) -> String {
        let mut text = text.to_string();

        for rule in &self.starting_quotes {
            text = rule.apply(&text);
        }
        for rule in &self.punctuation {
            text = rule.apply(&text);
        }
        text = self.brackets.apply(&text);
        text = self.double_dashes.apply(&text);

        // Clitic rules anchor on a trailing space.
        let mut text = format!(" {text} ");

        for rule in &self.ending_quotes {
            text = rule.apply(&text);
        }
        for rule in &self.contractions {
            text = rule.apply(&text);
        }

        text
    }
}

/// A word tokenizer following Penn Treebank conventions.
#[derive(Clone, Debug)]
pub struct TreebankWordTokenizer {
    rules: Arc<RuleSet>,
}

impl TreebankWordTokenizer {
    /// Create a new treebank tokenizer, compiling its rule set.
    pub fn new() -> Result<Self> {
        Ok(TreebankWordTokenizer {
            rules: Arc::new(RuleSet::build()?),
        })
    }

    /// Split text into word strings without building tokens.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.rules
            .rewrite(text)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl Tokenizer for TreebankWordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut cursor = 0;
        let tokens: Vec<Token> = self
            .split(text)
            .into_iter()
            .enumerate()
            .map(|(position, word)| {
                // Rewritten quotes (``, '') have no literal counterpart in the input.
                let (start, end) = match text[cursor..].find(word.as_str()) {
                    Some(offset) => (cursor + offset, cursor + offset + word.len()),
                    None => (cursor, cursor),
                };
                cursor = end;
                Token::with_offsets(word, position, start, end)
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "treebank"
    }
}
