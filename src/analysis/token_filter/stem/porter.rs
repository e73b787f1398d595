//! Porter stemming algorithm implementation.
//!
//! This module provides the Porter stemming algorithm with the widely used
//! set of extensions on top of the published rules:
//!
//! - a small pool of irregular forms (`dying` → `die`, `skies` → `sky`, ...)
//!   is resolved by lookup before any rule runs,
//! - words of one or two letters are returned unchanged,
//! - `ies`/`ied` on four-letter words become `ie` (`ties` → `tie`),
//! - a final `y` becomes `i` only after a consonant that is not the first letter,
//! - step 2 handles `alli` first and re-runs, and adds `fulli` → `ful` and
//!   `logi` → `log`,
//! - a two-letter vowel-consonant stem counts as ending in cvc.
//!
//! # Algorithm
//!
//! The Porter stemmer applies a series of rewrite rules in five steps:
//! 1. Plurals and -ed/-ing suffixes, then terminal y → i
//! 2. -ational → -ate, -tional → -tion, etc.
//! 3. -icate → -ic, -ative → "", etc.
//! 4. Remove -al, -ance, -ence, etc.
//! 5. Remove final -e and -ll
//!
//! Within a step the first suffix that matches decides: if its condition
//! does not hold the word is left as is and no later rule of that step runs.
//!
//! # Examples
//!
//! ```
//! use relief_triage::analysis::token_filter::stem::Stemmer;
//! use relief_triage::analysis::token_filter::stem::porter::PorterStemmer;
//!
//! let stemmer = PorterStemmer::new();
//!
//! assert_eq!(stemmer.stem("running"), "run");
//! assert_eq!(stemmer.stem("flies"), "fli");
//! assert_eq!(stemmer.stem("traditional"), "tradit");
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::analysis::token_filter::stem::Stemmer;

/// Irregular forms that bypass the rules entirely.
static IRREGULAR_FORMS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let groups: &[(&str, &[&str])] = &[
        ("sky", &["sky", "skies"]),
        ("die", &["dying"]),
        ("lie", &["lying"]),
        ("tie", &["tying"]),
        ("news", &["news"]),
        ("inning", &["innings", "inning"]),
        ("outing", &["outings", "outing"]),
        ("canning", &["cannings", "canning"]),
        ("howe", &["howe"]),
        ("proceed", &["proceed"]),
        ("exceed", &["exceed"]),
        ("succeed", &["succeed"]),
    ];

    groups
        .iter()
        .flat_map(|(stem, forms)| forms.iter().map(move |form| (*form, *stem)))
        .collect()
});

/// Condition evaluated on the stem left after removing a suffix.
type Condition = fn(&PorterStemmer, &[char]) -> bool;

/// A suffix rewrite rule.
struct Rule {
    suffix: &'static str,
    replacement: &'static str,
    condition: Condition,
}

const fn rule(suffix: &'static str, replacement: &'static str, condition: Condition) -> Rule {
    Rule {
        suffix,
        replacement,
        condition,
    }
}

fn positive_measure(stemmer: &PorterStemmer, stem: &[char]) -> bool {
    stemmer.measure(stem) > 0
}

fn measure_above_one(stemmer: &PorterStemmer, stem: &[char]) -> bool {
    stemmer.measure(stem) > 1
}

// The `l` stays with the stem when measuring so short stems like `geo` qualify.
fn positive_measure_with_l(stemmer: &PorterStemmer, stem: &[char]) -> bool {
    let mut with_l = stem.to_vec();
    with_l.push('l');
    stemmer.measure(&with_l) > 0
}

fn measure_above_one_after_s_or_t(stemmer: &PorterStemmer, stem: &[char]) -> bool {
    stemmer.measure(stem) > 1 && matches!(stem.last(), Some('s') | Some('t'))
}

fn always(_: &PorterStemmer, _: &[char]) -> bool {
    true
}

const STEP1A_RULES: &[Rule] = &[
    rule("sses", "ss", always),
    rule("ies", "i", always),
    rule("ss", "ss", always),
    rule("s", "", always),
];

const STEP2_RULES: &[Rule] = &[
    rule("ational", "ate", positive_measure),
    rule("tional", "tion", positive_measure),
    rule("enci", "ence", positive_measure),
    rule("anci", "ance", positive_measure),
    rule("izer", "ize", positive_measure),
    rule("bli", "ble", positive_measure),
    rule("alli", "al", positive_measure),
    rule("entli", "ent", positive_measure),
    rule("eli", "e", positive_measure),
    rule("ousli", "ous", positive_measure),
    rule("ization", "ize", positive_measure),
    rule("ation", "ate", positive_measure),
    rule("ator", "ate", positive_measure),
    rule("alism", "al", positive_measure),
    rule("iveness", "ive", positive_measure),
    rule("fulness", "ful", positive_measure),
    rule("ousness", "ous", positive_measure),
    rule("aliti", "al", positive_measure),
    rule("iviti", "ive", positive_measure),
    rule("biliti", "ble", positive_measure),
    rule("fulli", "ful", positive_measure),
    rule("logi", "log", positive_measure_with_l),
];

const STEP3_RULES: &[Rule] = &[
    rule("icate", "ic", positive_measure),
    rule("ative", "", positive_measure),
    rule("alize", "al", positive_measure),
    rule("iciti", "ic", positive_measure),
    rule("ical", "ic", positive_measure),
    rule("ful", "", positive_measure),
    rule("ness", "", positive_measure),
];

const STEP4_RULES: &[Rule] = &[
    rule("al", "", measure_above_one),
    rule("ance", "", measure_above_one),
    rule("ence", "", measure_above_one),
    rule("er", "", measure_above_one),
    rule("ic", "", measure_above_one),
    rule("able", "", measure_above_one),
    rule("ible", "", measure_above_one),
    rule("ant", "", measure_above_one),
    rule("ement", "", measure_above_one),
    rule("ment", "", measure_above_one),
    rule("ent", "", measure_above_one),
    rule("ion", "", measure_above_one_after_s_or_t),
    rule("ou", "", measure_above_one),
    rule("ism", "", measure_above_one),
    rule("ate", "", measure_above_one),
    rule("iti", "", measure_above_one),
    rule("ous", "", measure_above_one),
    rule("ive", "", measure_above_one),
    rule("ize", "", measure_above_one),
];

/// Porter stemming algorithm implementation.
#[derive(Debug, Clone, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }

    /// Check if the character at `pos` is a consonant.
    ///
    /// `y` is a consonant at the start of a word and after a vowel.
    fn is_consonant(&self, word: &[char], pos: usize) -> bool {
        match word[pos] {
            'a' | 'e' | 'i' | 'o' | 'u' => false,
            'y' if pos > 0 => !self.is_consonant(word, pos - 1),
            _ => true,
        }
    }

    /// Calculate the measure of a word: the number of vowel-consonant
    /// transitions in its `[C](VC){m}[V]` form.
    fn measure(&self, word: &[char]) -> usize {
        let mut m = 0;
        let mut previous_vowel = false;

        for pos in 0..word.len() {
            let consonant = self.is_consonant(word, pos);
            if consonant && previous_vowel {
                m += 1;
            }
            previous_vowel = !consonant;
        }

        m
    }

    /// Check if word contains a vowel.
    fn contains_vowel(&self, word: &[char]) -> bool {
        (0..word.len()).any(|pos| !self.is_consonant(word, pos))
    }

    /// Check if word ends with a double consonant.
    fn ends_double_consonant(&self, word: &[char]) -> bool {
        let len = word.len();
        len >= 2 && word[len - 1] == word[len - 2] && self.is_consonant(word, len - 1)
    }

    /// Check if word ends with a consonant-vowel-consonant pattern whose last
    /// letter is not w, x or y. A two-letter vowel-consonant word also counts.
    fn ends_cvc(&self, word: &[char]) -> bool {
        let len = word.len();
        if len >= 3 {
            self.is_consonant(word, len - 3)
                && !self.is_consonant(word, len - 2)
                && self.is_consonant(word, len - 1)
                && !matches!(word[len - 1], 'w' | 'x' | 'y')
        } else {
            len == 2 && !self.is_consonant(word, 0) && self.is_consonant(word, 1)
        }
    }

    fn ends_with(word: &[char], suffix: &str) -> bool {
        let suffix_len = suffix.chars().count();
        word.len() >= suffix_len
            && word[word.len() - suffix_len..]
                .iter()
                .copied()
                .eq(suffix.chars())
    }

    fn strip<'a>(word: &'a [char], suffix: &str) -> &'a [char] {
        &word[..word.len() - suffix.chars().count()]
    }

    fn join(stem: &[char], replacement: &str) -> Vec<char> {
        stem.iter().copied().chain(replacement.chars()).collect()
    }

    /// Apply the first rule whose suffix matches.
    fn apply_rules(&self, word: Vec<char>, rules: &[Rule]) -> Vec<char> {
        for rule in rules {
            if Self::ends_with(&word, rule.suffix) {
                let stem = Self::strip(&word, rule.suffix);
                if (rule.condition)(self, stem) {
                    return Self::join(stem, rule.replacement);
                }
                return word;
            }
        }
        word
    }

    /// Step 1a: plurals.
    fn step1a(&self, word: Vec<char>) -> Vec<char> {
        if word.len() == 4 && Self::ends_with(&word, "ies") {
            return Self::join(Self::strip(&word, "ies"), "ie");
        }
        self.apply_rules(word, STEP1A_RULES)
    }

    /// Step 1b: -eed, -ed and -ing.
    fn step1b(&self, word: Vec<char>) -> Vec<char> {
        if Self::ends_with(&word, "ied") {
            let replacement = if word.len() == 4 { "ie" } else { "i" };
            return Self::join(Self::strip(&word, "ied"), replacement);
        }

        if Self::ends_with(&word, "eed") {
            let stem = Self::strip(&word, "eed");
            if self.measure(stem) > 0 {
                return Self::join(stem, "ee");
            }
            return word;
        }

        let stem = ["ed", "ing"].iter().find_map(|suffix| {
            if Self::ends_with(&word, suffix) {
                let stem = Self::strip(&word, suffix);
                if self.contains_vowel(stem) {
                    return Some(stem.to_vec());
                }
            }
            None
        });

        let Some(stem) = stem else {
            return word;
        };

        for (suffix, replacement) in [("at", "ate"), ("bl", "ble"), ("iz", "ize")] {
            if Self::ends_with(&stem, suffix) {
                return Self::join(Self::strip(&stem, suffix), replacement);
            }
        }

        if self.ends_double_consonant(&stem) {
            return match stem.last() {
                Some('l') | Some('s') | Some('z') => stem,
                _ => stem[..stem.len() - 1].to_vec(),
            };
        }

        if self.measure(&stem) == 1 && self.ends_cvc(&stem) {
            return Self::join(&stem, "e");
        }

        stem
    }

    /// Step 1c: terminal y after a non-initial consonant becomes i.
    fn step1c(&self, mut word: Vec<char>) -> Vec<char> {
        let len = word.len();
        if len > 2 && word[len - 1] == 'y' && self.is_consonant(&word, len - 2) {
            word[len - 1] = 'i';
        }
        word
    }

    /// Step 2 of Porter algorithm.
    fn step2(&self, word: Vec<char>) -> Vec<char> {
        if Self::ends_with(&word, "alli") {
            let stem = Self::strip(&word, "alli");
            if self.measure(stem) > 0 {
                return self.step2(Self::join(stem, "al"));
            }
        }
        self.apply_rules(word, STEP2_RULES)
    }

    /// Step 3 of Porter algorithm.
    fn step3(&self, word: Vec<char>) -> Vec<char> {
        self.apply_rules(word, STEP3_RULES)
    }

    /// Step 4 of Porter algorithm.
    fn step4(&self, word: Vec<char>) -> Vec<char> {
        self.apply_rules(word, STEP4_RULES)
    }

    /// Step 5a: drop a final e.
    fn step5a(&self, word: Vec<char>) -> Vec<char> {
        if Self::ends_with(&word, "e") {
            let stem = Self::strip(&word, "e");
            let m = self.measure(stem);
            if m > 1 || (m == 1 && !self.ends_cvc(stem)) {
                return stem.to_vec();
            }
        }
        word
    }

    /// Step 5b: -ll becomes -l on long words.
    fn step5b(&self, word: Vec<char>) -> Vec<char> {
        if Self::ends_with(&word, "ll") && self.measure(&word[..word.len() - 1]) > 1 {
            return word[..word.len() - 1].to_vec();
        }
        word
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        let word = word.to_lowercase();

        if let Some(stem) = IRREGULAR_FORMS.get(word.as_str()) {
            return stem.to_string();
        }

        let chars: Vec<char> = word.chars().collect();
        if chars.len() <= 2 {
            return word;
        }

        let chars = self.step1a(chars);
        let chars = self.step1b(chars);
        let chars = self.step1c(chars);
        let chars = self.step2(chars);
        let chars = self.step3(chars);
        let chars = self.step4(chars);
        let chars = self.step5a(chars);
        self.step5b(chars).into_iter().collect()
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}
