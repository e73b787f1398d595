//! Lowercase char filter.

use super::{CharFilter, Transformation};

/// A char filter that lowercases the entire input string.
///
/// Lowercasing happens before URL detection so that `HTTP://` prefixes are
/// recognized by the lowercase URL pattern.
#[derive(Clone, Debug, Default)]
pub struct LowercaseCharFilter;

impl LowercaseCharFilter {
    /// Create a new lowercase char filter.
    pub fn new() -> Self {
        LowercaseCharFilter
    }
}

impl CharFilter for LowercaseCharFilter {
    fn filter(&self, input: &str) -> (String, Vec<Transformation>) {
        if input.is_ascii() {
            return (input.to_ascii_lowercase(), Vec::new());
        }

        let mut output = String::with_capacity(input.len());
        let mut transformations = Vec::new();

        for (start, ch) in input.char_indices() {
            let new_start = output.len();
            output.extend(ch.to_lowercase());
            let new_end = output.len();
            let end = start + ch.len_utf8();

            if new_end - new_start != end - start {
                transformations.push(Transformation::new(start, end, new_start, new_end));
            }
        }

        (output, transformations)
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_ascii() {
        let filter = LowercaseCharFilter::new();
        let (output, transformations) = filter.filter("We NEED Water");
        assert_eq!(output, "we need water");
        assert!(transformations.is_empty());
    }

    #[test]
    fn test_lowercase_unicode_records_length_change() {
        let filter = LowercaseCharFilter::new();
        // U+0130 lowercases to "i" followed by a combining dot (3 bytes vs 2).
        let (output, transformations) = filter.filter("\u{130}X");
        assert_eq!(output, "i\u{307}x");
        assert_eq!(transformations.len(), 1);
        assert_eq!(transformations[0].original_end, 2);
        assert_eq!(transformations[0].new_end, 3);
    }
}
