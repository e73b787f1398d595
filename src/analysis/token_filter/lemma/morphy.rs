//! Rule-and-exception lemmatizer in the style of WordNet's morphy.
//!
//! For a word and a part of speech the candidates are the word itself plus
//! either its irregular forms (when the exception table lists it) or the
//! results of the detachment rules. Only candidates found in the lexicon
//! survive; the shortest survivor is the lemma. When nothing survives the
//! rules are applied again to their own output, and a word with no known
//! base form is returned unchanged.

use std::sync::Arc;

use super::Lemmatizer;
use super::lexicon::{DEFAULT_LEXICON, Lexicon, PartOfSpeech};

const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

const VERB_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
];

fn rules(pos: PartOfSpeech) -> &'static [(&'static str, &'static str)] {
    match pos {
        PartOfSpeech::Noun => NOUN_RULES,
        PartOfSpeech::Verb => VERB_RULES,
    }
}

/// Lexicon-gated morphological lemmatizer.
#[derive(Clone, Debug)]
pub struct MorphyLemmatizer {
    lexicon: Arc<Lexicon>,
}

impl MorphyLemmatizer {
    /// Create a lemmatizer over the embedded WordNet tables.
    pub fn new() -> Self {
        MorphyLemmatizer {
            lexicon: Arc::clone(&DEFAULT_LEXICON),
        }
    }

    /// Create a lemmatizer over a custom lexicon.
    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        MorphyLemmatizer {
            lexicon: Arc::new(lexicon),
        }
    }

    /// The lexicon candidates are checked against.
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    fn detach(forms: &[String], pos: PartOfSpeech) -> Vec<String> {
        forms
            .iter()
            .flat_map(|form| {
                rules(pos).iter().filter_map(move |(suffix, replacement)| {
                    form.strip_suffix(suffix)
                        .map(|stem| format!("{stem}{replacement}"))
                })
            })
            .collect()
    }

    fn known(&self, forms: Vec<String>, pos: PartOfSpeech) -> Vec<String> {
        let mut known: Vec<String> = Vec::new();
        for form in forms {
            if self.lexicon.contains(&form, pos) && !known.contains(&form) {
                known.push(form);
            }
        }
        known
    }

    /// All base forms of `word` the lexicon accepts, in discovery order.
    pub fn base_forms(&self, word: &str, pos: PartOfSpeech) -> Vec<String> {
        if let Some(irregular) = self.lexicon.exceptions(word, pos) {
            let mut forms = vec![word.to_string()];
            forms.extend(irregular.iter().cloned());
            return self.known(forms, pos);
        }

        let mut forms = Self::detach(&[word.to_string()], pos);
        let mut candidates = vec![word.to_string()];
        candidates.extend(forms.iter().cloned());

        let mut found = self.known(candidates, pos);
        while found.is_empty() && !forms.is_empty() {
            forms = Self::detach(&forms, pos);
            found = self.known(forms.clone(), pos);
        }

        found
    }
}

impl Default for MorphyLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer for MorphyLemmatizer {
    fn lemmatize(&self, word: &str, pos: PartOfSpeech) -> String {
        self.base_forms(word, pos)
            .into_iter()
            .min_by_key(|form| form.len())
            .unwrap_or_else(|| word.to_string())
    }

    fn name(&self) -> &'static str {
        "morphy"
    }
}
