//! Decoding of the semicolon-encoded category string.
//!
//! The wire format is `name1-v1;name2-v2;...;nameN-vN`. Each token is split
//! at its last `-`: the left side is the category name, the right side must
//! be a single ASCII digit. Names may themselves contain `-`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// How label values other than 0 and 1 are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Fail the whole run with a data integrity error.
    #[default]
    Reject,
    /// Map any value above 1 to 1.
    Clamp,
    /// Discard the record and keep going.
    Drop,
}

/// A parsed `name-value` token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryToken<'a> {
    pub name: &'a str,
    pub value: u8,
}

/// Split an encoded category string into its tokens.
pub fn parse_categories(raw: &str) -> Result<Vec<CategoryToken<'_>>> {
    raw.split(';').map(parse_token).collect()
}

fn parse_token(token: &str) -> Result<CategoryToken<'_>> {
    let (name, value) = token.rsplit_once('-').ok_or_else(|| {
        TriageError::schema(format!("Category token '{token}' is not of the form name-value"))
    })?;

    if name.is_empty() {
        return Err(TriageError::schema(format!(
            "Category token '{token}' has an empty name"
        )));
    }

    let mut digits = value.chars();
    match (digits.next(), digits.next()) {
        (Some(digit), None) if digit.is_ascii_digit() => Ok(CategoryToken {
            name,
            value: digit as u8 - b'0',
        }),
        _ => Err(TriageError::schema(format!(
            "Category token '{token}' does not end in a single digit"
        ))),
    }
}

/// The canonical, ordered list of category names of a dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySchema {
    names: Vec<String>,
}

impl CategorySchema {
    /// Create a schema from category names.
    pub fn new(names: Vec<String>) -> Self {
        CategorySchema { names }
    }

    /// Establish the schema from an encoded category string.
    pub fn from_encoded(raw: &str) -> Result<Self> {
        let tokens = parse_categories(raw)?;
        Ok(CategorySchema {
            names: tokens.iter().map(|t| t.name.to_string()).collect(),
        })
    }

    /// Get the category names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Get the number of categories.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the schema has no categories.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Decode an encoded category string against this schema.
    ///
    /// Returns `Ok(None)` when the record is dropped under
    /// [`LabelPolicy::Drop`]. The category names and their order must match
    /// the schema exactly.
    pub fn decode(&self, raw: &str, policy: LabelPolicy) -> Result<Option<Vec<u8>>> {
        let tokens = parse_categories(raw)?;

        if tokens.len() != self.names.len() {
            return Err(TriageError::schema(format!(
                "Expected {} categories, found {}",
                self.names.len(),
                tokens.len()
            )));
        }

        let mut labels = Vec::with_capacity(tokens.len());
        for (token, expected) in tokens.iter().zip(&self.names) {
            if token.name != expected {
                return Err(TriageError::schema(format!(
                    "Expected category '{expected}', found '{}'",
                    token.name
                )));
            }

            let value = match (token.value, policy) {
                (0 | 1, _) => token.value,
                (_, LabelPolicy::Clamp) => 1,
                (_, LabelPolicy::Drop) => return Ok(None),
                (other, LabelPolicy::Reject) => {
                    return Err(TriageError::data_integrity(format!(
                        "Category '{expected}' has value {other}, expected 0 or 1"
                    )));
                }
            };
            labels.push(value);
        }

        Ok(Some(labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_categories() {
        let tokens = parse_categories("related-1;request-0;aid_related-1").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], CategoryToken { name: "related", value: 1 });
        assert_eq!(tokens[2].name, "aid_related");
    }

    #[test]
    fn test_name_with_dash() {
        let tokens = parse_categories("search-and-rescue-1").unwrap();
        assert_eq!(tokens[0].name, "search-and-rescue");
        assert_eq!(tokens[0].value, 1);
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(parse_categories("related"), Err(TriageError::Schema(_))));
        assert!(matches!(parse_categories("related-x"), Err(TriageError::Schema(_))));
        assert!(matches!(parse_categories("related-10"), Err(TriageError::Schema(_))));
        assert!(matches!(parse_categories("-1"), Err(TriageError::Schema(_))));
        assert!(matches!(parse_categories("related-1;"), Err(TriageError::Schema(_))));
    }

    #[test]
    fn test_decode_against_schema() {
        let schema = CategorySchema::from_encoded("related-1;request-0").unwrap();
        assert_eq!(schema.names(), &["related".to_string(), "request".to_string()]);

        let labels = schema.decode("related-0;request-1", LabelPolicy::Reject).unwrap();
        assert_eq!(labels, Some(vec![0, 1]));

        let err = schema.decode("request-0;related-1", LabelPolicy::Reject).unwrap_err();
        assert!(matches!(err, TriageError::Schema(_)));

        let err = schema.decode("related-1", LabelPolicy::Reject).unwrap_err();
        assert!(matches!(err, TriageError::Schema(_)));
    }

    #[test]
    fn test_out_of_range_policies() {
        let schema = CategorySchema::from_encoded("related-1;request-0").unwrap();

        let err = schema.decode("related-2;request-0", LabelPolicy::Reject).unwrap_err();
        assert!(matches!(err, TriageError::DataIntegrity(_)));

        let labels = schema.decode("related-2;request-0", LabelPolicy::Clamp).unwrap();
        assert_eq!(labels, Some(vec![1, 0]));

        let labels = schema.decode("related-2;request-0", LabelPolicy::Drop).unwrap();
        assert_eq!(labels, None);
    }

    #[test]
    fn test_policy_serde() {
        let policy: LabelPolicy = serde_json::from_str("\"clamp\"").unwrap();
        assert_eq!(policy, LabelPolicy::Clamp);
        assert_eq!(LabelPolicy::default(), LabelPolicy::Reject);
    }
}
