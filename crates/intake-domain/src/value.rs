//! Field values and the per-section maps that hold them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Values a page can submit for a single field.
///
/// Serialized untagged so persisted documents hold plain JSON scalars and
/// arrays. Reading a document back cannot tell a `Choice` from a `Text` (or a
/// `Date` from a `Text`); stored submissions are only ever displayed, so the
/// loss is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Choices(Vec<String>),
    #[serde(skip_deserializing)]
    Choice(String),
    #[serde(skip_deserializing)]
    Date(NaiveDate),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn choice(value: impl Into<String>) -> Self {
        FieldValue::Choice(value.into())
    }

    pub fn choices<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Choices(values.into_iter().map(Into::into).collect())
    }

    /// Blank text, blank choice and an empty choice list count as empty.
    /// Numbers, booleans and dates always carry a value.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(value) | FieldValue::Choice(value) => value.trim().is_empty(),
            FieldValue::Choices(values) => values.iter().all(|value| value.trim().is_empty()),
            FieldValue::Integer(_)
            | FieldValue::Number(_)
            | FieldValue::Boolean(_)
            | FieldValue::Date(_) => false,
        }
    }

    /// Borrowed string form for text-like values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) | FieldValue::Choice(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            FieldValue::Number(value) if value.fract() == 0.0 => Some(*value as i64),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) | FieldValue::Choice(value) => f.write_str(value),
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Boolean(true) => f.write_str("Yes"),
            FieldValue::Boolean(false) => f.write_str("No"),
            FieldValue::Choices(values) if values.is_empty() => f.write_str("None"),
            FieldValue::Choices(values) => f.write_str(&values.join(", ")),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Values captured by one page, keyed by field name.
pub type SectionData = BTreeMap<String, FieldValue>;

/// Stable key of a fixed section (`contact`, `course`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness_depends_on_kind() {
        assert!(FieldValue::text("   ").is_empty());
        assert!(FieldValue::choice("").is_empty());
        assert!(FieldValue::Choices(Vec::new()).is_empty());
        assert!(!FieldValue::Integer(0).is_empty());
        assert!(!FieldValue::Boolean(false).is_empty());
        assert!(!FieldValue::choices(["Docker"]).is_empty());
    }

    #[test]
    fn values_serialize_as_plain_json() {
        let mut data = SectionData::new();
        data.insert("name".into(), FieldValue::text("Ada"));
        data.insert("labs".into(), FieldValue::Integer(3));
        data.insert("remote".into(), FieldValue::Boolean(true));
        data.insert("tags".into(), FieldValue::choices(["GNS3", "Docker"]));
        data.insert(
            "target".into(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()),
        );

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["labs"], 3);
        assert_eq!(json["remote"], true);
        assert_eq!(json["tags"][1], "Docker");
        assert_eq!(json["target"], "2025-02-01");
    }

    #[test]
    fn display_matches_review_formatting() {
        assert_eq!(FieldValue::Boolean(false).to_string(), "No");
        assert_eq!(FieldValue::Choices(Vec::new()).to_string(), "None");
        assert_eq!(FieldValue::choices(["A", "B"]).to_string(), "A, B");
    }
}
