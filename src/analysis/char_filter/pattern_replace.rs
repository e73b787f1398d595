use regex::Regex;

use super::{CharFilter, Transformation};
use crate::error::Result;

/// Pattern matching `http`/`https` URLs: the scheme followed by a run of
/// alphanumerics, the `$`..`_` punctuation range, `@.&+!*(),` and percent escapes.
pub const URL_PATTERN: &str =
    r"http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+";

/// Every character that is not an ASCII letter or digit.
pub const NON_ALPHANUMERIC_PATTERN: &str = r"[^a-zA-Z0-9]";

/// A char filter that replaces substrings matching a regex pattern.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
    name: &'static str,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.to_string(),
            name: "pattern_replace",
        })
    }

    /// Replace every URL with the given placeholder token.
    pub fn url_masker(placeholder: &str) -> Result<Self> {
        let mut filter = Self::new(URL_PATTERN, placeholder)?;
        filter.name = "url_mask";
        Ok(filter)
    }

    /// Replace every non-alphanumeric character with a single space.
    pub fn punctuation_stripper() -> Result<Self> {
        let mut filter = Self::new(NON_ALPHANUMERIC_PATTERN, " ")?;
        filter.name = "punctuation_strip";
        Ok(filter)
    }

    /// Get the regex pattern of this filter.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> (String, Vec<Transformation>) {
        let mut output = String::with_capacity(input.len());
        let mut transformations = Vec::new();
        let mut last_match_end = 0;

        for m in self.pattern.find_iter(input) {
            output.push_str(&input[last_match_end..m.start()]);

            let replacement_start = output.len();
            output.push_str(&self.replacement);
            let replacement_end = output.len();

            // Only length-changing replacements affect offset mapping.
            if m.end() - m.start() != replacement_end - replacement_start {
                transformations.push(Transformation::new(
                    m.start(),
                    m.end(),
                    replacement_start,
                    replacement_end,
                ));
            }

            last_match_end = m.end();
        }

        output.push_str(&input[last_match_end..]);

        (output, transformations)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_replace() {
        let filter = PatternReplaceCharFilter::new(r"(\d+)", "NUM").unwrap();
        let (output, transformations) = filter.filter("Year 2010");
        assert_eq!(output, "Year NUM");
        assert_eq!(transformations.len(), 1);
        assert_eq!(transformations[0].original_start, 5);
        assert_eq!(transformations[0].original_end, 9);
        assert_eq!(transformations[0].new_start, 5);
        assert_eq!(transformations[0].new_end, 8);
    }

    #[test]
    fn test_url_masker() {
        let filter = PatternReplaceCharFilter::url_masker("urlplaceholder").unwrap();
        let (output, _) = filter.filter("see http://example.com/a?b=1 now");
        assert_eq!(output, "see urlplaceholder now");

        let (output, _) =
            filter.filter("https://t.co/x1 and http://a.org/%20b");
        assert_eq!(output, "urlplaceholder and urlplaceholder");
        assert_eq!(filter.name(), "url_mask");
    }

    #[test]
    fn test_url_masker_ignores_plain_text() {
        let filter = PatternReplaceCharFilter::url_masker("urlplaceholder").unwrap();
        let (output, transformations) = filter.filter("no links in http here");
        assert_eq!(output, "no links in http here");
        assert!(transformations.is_empty());
    }

    #[test]
    fn test_punctuation_stripper() {
        let filter = PatternReplaceCharFilter::punctuation_stripper().unwrap();
        let (output, transformations) = filter.filter("flood!!! need-water, now.");
        assert_eq!(output, "flood    need water  now ");
        // Single ASCII characters replaced by a single space keep their length.
        assert!(transformations.is_empty());

        let (output, transformations) = filter.filter("café");
        assert_eq!(output, "caf ");
        assert_eq!(transformations.len(), 1);
    }
}
