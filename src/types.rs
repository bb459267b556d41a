//! Common types used throughout recipe-pager
//!
//! List orderings and small serde helpers shared by the store, pagination
//! and domain modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Ordering
// ============================================================================

/// Sort direction for a list ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest key first
    #[default]
    Asc,
    /// Largest key first
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Comparison operator that selects rows strictly after a key in this direction
    pub fn after_operator(self) -> &'static str {
        match self {
            Self::Asc => ">",
            Self::Desc => "<",
        }
    }

    /// Apply this direction to an ascending comparison
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// A single ordering key plus direction
///
/// Stores break ties on `id` in the same direction, which turns any key into a
/// total order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field (column) name
    pub field: String,
    /// Direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    /// Ascending order on a field
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending order on a field
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Newest first, the ordering every list endpoint uses
    pub fn newest_first() -> Self {
        Self::desc("created_at")
    }

    /// Whether the key is the record id itself
    pub fn is_id(&self) -> bool {
        self.field == "id"
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::asc("id")
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction.as_sql())
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty or whitespace
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.trim().is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.trim().is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// Deserialize a label list into trimmed, lowercase items
///
/// Accepts a comma-separated string (`a,b,c`), a sequence of such strings
/// (`?tags=a&tags=b,c` through a repeated-key aware query extractor), or a
/// missing value. Use with `#[serde(default, deserialize_with = "comma_separated")]`.
pub fn comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct LabelsVisitor;

    impl<'de> serde::de::Visitor<'de> for LabelsVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a comma-separated string or a list of strings")
        }

        fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Self::Value, E> {
            let mut labels = Vec::new();
            push_labels(&mut labels, value);
            Ok(labels)
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_some<D2: serde::Deserializer<'de>>(
            self,
            deserializer: D2,
        ) -> Result<Self::Value, D2::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut labels = Vec::new();
            while let Some(value) = seq.next_element::<String>()? {
                push_labels(&mut labels, &value);
            }
            Ok(labels)
        }
    }

    deserializer.deserialize_any(LabelsVisitor)
}

fn push_labels(labels: &mut Vec<String>, raw: &str) {
    labels.extend(
        raw.split(',')
            .map(|item| item.trim().to_lowercase())
            .filter(|item| !item.is_empty()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_sort_direction_default() {
        assert_eq!(SortDirection::default(), SortDirection::Asc);
    }

    #[test]
    fn test_sort_direction_apply() {
        assert_eq!(SortDirection::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortDirection::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortDirection::Desc.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn test_order_by_serde() {
        let order: OrderBy = serde_json::from_str(r#"{"field":"created_at","direction":"desc"}"#)
            .unwrap();
        assert_eq!(order, OrderBy::newest_first());

        let order: OrderBy = serde_json::from_str(r#"{"field":"id"}"#).unwrap();
        assert_eq!(order, OrderBy::default());
        assert!(order.is_id());
    }

    #[test]
    fn test_order_by_display() {
        assert_eq!(OrderBy::newest_first().to_string(), "created_at DESC");
        assert_eq!(OrderBy::asc("title").to_string(), "title ASC");
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some("".to_string()).none_if_empty(), None);
        assert_eq!(Some("  ".to_string()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
        assert_eq!("test".to_string().none_if_empty(), Some("test".to_string()));
        assert_eq!("".to_string().none_if_empty(), None);
    }

    #[derive(Debug, Deserialize)]
    struct Labels {
        #[serde(default, deserialize_with = "comma_separated")]
        tags: Vec<String>,
    }

    #[test]
    fn test_comma_separated() {
        let labels: Labels = serde_json::from_str(r#"{"tags":" Vegan, quick ,,"}"#).unwrap();
        assert_eq!(labels.tags, vec!["vegan", "quick"]);

        let labels: Labels = serde_json::from_str("{}").unwrap();
        assert!(labels.tags.is_empty());

        let labels: Labels = serde_json::from_str(r#"{"tags":""}"#).unwrap();
        assert!(labels.tags.is_empty());

        let labels: Labels = serde_json::from_str(r#"{"tags":null}"#).unwrap();
        assert!(labels.tags.is_empty());
    }

    #[test]
    fn test_comma_separated_accepts_repeated_values() {
        let labels: Labels =
            serde_json::from_str(r#"{"tags":["Vegan", "quick,spicy", " "]}"#).unwrap();
        assert_eq!(labels.tags, vec!["vegan", "quick", "spicy"]);
    }
}
