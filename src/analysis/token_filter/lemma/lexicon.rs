//! Lexicon and irregular-form tables for the morphy lemmatizer.
//!
//! The lexicon answers two questions: is this string a base form of the given
//! part of speech, and does the word have irregular base forms? The embedded
//! tables live under `resources/wordnet/` in WordNet's own layouts (`*.exc`
//! exception lists and one lemma per line, the first column of `index.*`), so
//! a full WordNet `dict/` directory can be loaded in their place with
//! [`Lexicon::from_wordnet_dir`].

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Grammatical role a word is lemmatized as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    Verb,
}

impl PartOfSpeech {
    /// Parse the one-letter tag used in word-list files.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "n" | "noun" => Some(PartOfSpeech::Noun),
            "v" | "verb" => Some(PartOfSpeech::Verb),
            _ => None,
        }
    }
}

const NOUN_EXCEPTIONS: &str = include_str!("../../../../resources/wordnet/noun.exc");
const VERB_EXCEPTIONS: &str = include_str!("../../../../resources/wordnet/verb.exc");
const NOUN_LEMMAS: &str = include_str!("../../../../resources/wordnet/noun.lemmas");
const VERB_LEMMAS: &str = include_str!("../../../../resources/wordnet/verb.lemmas");

/// The lexicon built from the embedded tables, shared by every default lemmatizer.
pub static DEFAULT_LEXICON: LazyLock<Arc<Lexicon>> = LazyLock::new(|| Arc::new(Lexicon::embedded()));

/// First field of a lemma-list or `index.*` line. Indented lines are the
/// WordNet license header and `#` lines are comments.
fn lemma_field(line: &str) -> Option<&str> {
    if line.starts_with(char::is_whitespace) || line.starts_with('#') {
        return None;
    }
    line.split_whitespace().next()
}

/// Inflected forms mapped to their base forms, one `form base [base ...]` per line.
#[derive(Clone, Debug, Default)]
pub struct ExceptionTable {
    entries: HashMap<String, Vec<String>>,
}

impl ExceptionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `base` as a base form of `form`.
    pub fn insert<S: Into<String>>(&mut self, form: S, base: S) {
        let bases = self.entries.entry(form.into()).or_default();
        let base = base.into();
        if !bases.contains(&base) {
            bases.push(base);
        }
    }

    /// Base forms of `form`, in file order.
    pub fn get(&self, form: &str) -> Option<&[String]> {
        self.entries.get(form).map(Vec::as_slice)
    }

    /// Number of inflected forms in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bases(&self) -> impl Iterator<Item = &String> {
        self.entries.values().flatten()
    }

    /// Parse one line; false when it carries a form but no base.
    fn insert_line(&mut self, line: &str) -> bool {
        let mut fields = line.split_whitespace();
        let Some(form) = fields.next() else {
            return true;
        };
        let mut inserted = false;
        for base in fields {
            self.insert(form.to_lowercase(), base.to_lowercase());
            inserted = true;
        }
        inserted
    }

    /// Build a table from in-memory `.exc` text, skipping malformed lines.
    pub fn parse(text: &str) -> Self {
        let mut table = ExceptionTable::new();
        for line in text.lines() {
            table.insert_line(line);
        }
        table
    }

    /// Merge entries from `.exc` formatted input. Returns the number of lines read.
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut count = 0;

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if !self.insert_line(&line) {
                return Err(TriageError::analysis(format!(
                    "Exception entry on line {} has no base form",
                    line_number + 1
                )));
            }
            count += 1;
        }

        Ok(count)
    }
}

/// Known base forms and irregular-form tables per part of speech.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    nouns: HashSet<String>,
    verbs: HashSet<String>,
    noun_exceptions: ExceptionTable,
    verb_exceptions: ExceptionTable,
}

impl Lexicon {
    /// Create an empty lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lexicon from the embedded lemma lists and exception tables.
    pub fn embedded() -> Self {
        let mut lexicon = Lexicon::new();

        for (text, pos) in [(NOUN_LEMMAS, PartOfSpeech::Noun), (VERB_LEMMAS, PartOfSpeech::Verb)] {
            for word in text.lines().filter_map(lemma_field) {
                lexicon.insert(word, pos);
            }
        }
        lexicon.merge_exceptions(ExceptionTable::parse(NOUN_EXCEPTIONS), PartOfSpeech::Noun);
        lexicon.merge_exceptions(ExceptionTable::parse(VERB_EXCEPTIONS), PartOfSpeech::Verb);

        lexicon
    }

    /// Load `index.noun`, `index.verb`, `noun.exc` and `verb.exc` from a
    /// WordNet `dict` directory.
    pub fn from_wordnet_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut lexicon = Lexicon::new();

        for (name, pos) in [("noun", PartOfSpeech::Noun), ("verb", PartOfSpeech::Verb)] {
            let index = File::open(dir.join(format!("index.{name}")))?;
            lexicon.extend_lemmas_from_reader(BufReader::new(index), pos)?;

            let mut table = ExceptionTable::new();
            let exc = File::open(dir.join(format!("{name}.exc")))?;
            table.extend_from_reader(BufReader::new(exc))?;
            lexicon.merge_exceptions(table, pos);
        }

        Ok(lexicon)
    }

    fn words(&self, pos: PartOfSpeech) -> &HashSet<String> {
        match pos {
            PartOfSpeech::Noun => &self.nouns,
            PartOfSpeech::Verb => &self.verbs,
        }
    }

    fn exception_table(&self, pos: PartOfSpeech) -> &ExceptionTable {
        match pos {
            PartOfSpeech::Noun => &self.noun_exceptions,
            PartOfSpeech::Verb => &self.verb_exceptions,
        }
    }

    /// Add a base form. Empty strings are ignored.
    pub fn insert<S: Into<String>>(&mut self, word: S, pos: PartOfSpeech) {
        let word = word.into();
        if word.is_empty() {
            return;
        }
        match pos {
            PartOfSpeech::Noun => self.nouns.insert(word),
            PartOfSpeech::Verb => self.verbs.insert(word),
        };
    }

    /// Merge an exception table. Every base it names becomes a known base form.
    pub fn merge_exceptions(&mut self, table: ExceptionTable, pos: PartOfSpeech) {
        let bases: Vec<String> = table.bases().cloned().collect();
        for base in bases {
            self.insert(base, pos);
        }

        let target = match pos {
            PartOfSpeech::Noun => &mut self.noun_exceptions,
            PartOfSpeech::Verb => &mut self.verb_exceptions,
        };
        for (form, bases) in table.entries {
            for base in bases {
                target.insert(form.clone(), base);
            }
        }
    }

    /// Check whether `word` is a known base form of `pos`.
    pub fn contains(&self, word: &str, pos: PartOfSpeech) -> bool {
        self.words(pos).contains(word)
    }

    /// Irregular base forms of `word` for `pos`, if the exception table lists it.
    pub fn exceptions(&self, word: &str, pos: PartOfSpeech) -> Option<&[String]> {
        self.exception_table(pos).get(word)
    }

    /// Number of base forms known for `pos`.
    pub fn len(&self, pos: PartOfSpeech) -> usize {
        self.words(pos).len()
    }

    /// Check whether the lexicon holds no words at all.
    pub fn is_empty(&self) -> bool {
        self.nouns.is_empty() && self.verbs.is_empty()
    }

    /// Merge the first field of every line of a lemma list or WordNet
    /// `index.*` file as a base form of `pos`. Returns the number of lemmas read.
    pub fn extend_lemmas_from_reader<R: BufRead>(
        &mut self,
        reader: R,
        pos: PartOfSpeech,
    ) -> Result<usize> {
        let mut count = 0;
        for line in reader.lines() {
            let line = line?;
            if let Some(word) = lemma_field(&line) {
                self.insert(word.to_lowercase(), pos);
                count += 1;
            }
        }
        Ok(count)
    }

    /// Merge entries from a word list.
    ///
    /// Each non-empty line is `word` or `word<whitespace>tag` where tag is
    /// `n`/`noun` or `v`/`verb`; untagged words are added as both. Lines
    /// starting with `#` are comments. Returns the number of entries read.
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut count = 0;

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let word = fields.next().unwrap_or_default().to_lowercase();
            match fields.next() {
                None => {
                    self.insert(word.clone(), PartOfSpeech::Noun);
                    self.insert(word, PartOfSpeech::Verb);
                }
                Some(tag) => {
                    let pos = PartOfSpeech::from_tag(tag).ok_or_else(|| {
                        TriageError::analysis(format!(
                            "Unknown part-of-speech tag '{tag}' on line {}",
                            line_number + 1
                        ))
                    })?;
                    self.insert(word, pos);
                }
            }
            count += 1;
        }

        Ok(count)
    }

    /// Merge entries from a word-list file (see [`Lexicon::extend_from_reader`]).
    pub fn load_word_list<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let file = File::open(path.as_ref())?;
        self.extend_from_reader(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_lexicon() {
        let lexicon = Lexicon::embedded();
        assert!(lexicon.contains("box", PartOfSpeech::Noun));
        assert!(lexicon.contains("eat", PartOfSpeech::Verb));
        assert!(lexicon.contains("woman", PartOfSpeech::Noun));
        assert!(!lexicon.contains("woman", PartOfSpeech::Verb));
        assert!(lexicon.contains("policeman", PartOfSpeech::Noun));
        assert!(lexicon.contains("fisherman", PartOfSpeech::Noun));
        assert!(lexicon.len(PartOfSpeech::Noun) > 1000);
        assert!(lexicon.len(PartOfSpeech::Verb) > 500);
    }

    #[test]
    fn test_exception_lookup() {
        let lexicon = Lexicon::embedded();
        let bases = |word: &str, pos: PartOfSpeech| lexicon.exceptions(word, pos).map(<[String]>::to_vec);

        assert_eq!(bases("went", PartOfSpeech::Verb), Some(vec!["go".to_string()]));
        assert_eq!(bases("went", PartOfSpeech::Noun), None);
        assert_eq!(bases("teeth", PartOfSpeech::Noun), Some(vec!["tooth".to_string()]));
        assert_eq!(bases("understood", PartOfSpeech::Verb), Some(vec!["understand".to_string()]));
        assert_eq!(bases("axes", PartOfSpeech::Noun), Some(vec!["ax".to_string(), "axis".to_string()]));
    }

    #[test]
    fn test_exception_bases_are_lemmas() {
        let lexicon = Lexicon::embedded();
        for pos in [PartOfSpeech::Noun, PartOfSpeech::Verb] {
            for base in lexicon.exception_table(pos).bases() {
                assert!(lexicon.contains(base, pos), "{base} missing as {pos:?}");
            }
        }
    }

    #[test]
    fn test_exception_table_reader() {
        let mut table = ExceptionTable::new();
        let count = table.extend_from_reader("fled flee\n\nlay lie\n".as_bytes()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(table.get("lay"), Some(&["lie".to_string()][..]));

        let err = table.extend_from_reader("fled flee\nspent\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_from_wordnet_dir() {
        let dir = tempfile::tempdir().unwrap();
        let license = "  1 This software and database is being provided\n  2 WordNet 3.0 Copyright\n";
        std::fs::write(
            dir.path().join("index.noun"),
            format!("{license}sandbag n 1 2 @ ~ 1 0 04123740\ntarp n 1 1 @ 1 0 04395875\n"),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("index.verb"),
            format!("{license}airlift v 1 1 @ 1 0 01957529\n"),
        )
        .unwrap();
        std::fs::write(dir.path().join("noun.exc"), "geese goose\n").unwrap();
        std::fs::write(dir.path().join("verb.exc"), "fled flee\n").unwrap();

        let lexicon = Lexicon::from_wordnet_dir(dir.path()).unwrap();

        assert!(lexicon.contains("sandbag", PartOfSpeech::Noun));
        assert!(lexicon.contains("airlift", PartOfSpeech::Verb));
        assert!(!lexicon.contains("1", PartOfSpeech::Noun));
        assert!(lexicon.contains("goose", PartOfSpeech::Noun));
        assert!(lexicon.contains("flee", PartOfSpeech::Verb));
        assert_eq!(lexicon.len(PartOfSpeech::Noun), 3);
    }

    #[test]
    fn test_from_wordnet_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Lexicon::from_wordnet_dir(dir.path()).is_err());
    }

    #[test]
    fn test_extend_from_reader() {
        let list = "# extra relief words\nsandbag n\nairlift\n\nevacuee noun\n";
        let mut lexicon = Lexicon::new();

        let count = lexicon.extend_from_reader(list.as_bytes()).unwrap();

        assert_eq!(count, 3);
        assert!(lexicon.contains("sandbag", PartOfSpeech::Noun));
        assert!(!lexicon.contains("sandbag", PartOfSpeech::Verb));
        assert!(lexicon.contains("airlift", PartOfSpeech::Noun));
        assert!(lexicon.contains("airlift", PartOfSpeech::Verb));
        assert_eq!(lexicon.len(PartOfSpeech::Noun), 3);
    }

    #[test]
    fn test_extend_rejects_unknown_tag() {
        let mut lexicon = Lexicon::new();
        let err = lexicon.extend_from_reader("tarp adj\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
