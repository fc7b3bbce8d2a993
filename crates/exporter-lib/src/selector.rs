//! Exact-match label selectors
//!
//! A selector built from a label map matches an object when every declared
//! key is present with exactly the declared value. An empty selector matches
//! everything.

use std::collections::BTreeMap;
use std::fmt;

/// Conjunction of `key=value` requirements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: BTreeMap<String, String>,
}

impl LabelSelector {
    /// Selector matching every object
    pub fn everything() -> Self {
        Self::default()
    }

    /// Build a selector from a label set
    pub fn from_labels(labels: &BTreeMap<String, String>) -> Self {
        Self {
            requirements: labels.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Check whether the given object labels satisfy every requirement
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    }
}

/// Renders the selector in the API server's `labelSelector` query syntax,
/// with keys in sorted order
impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.requirements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_selector_string_is_sorted() {
        let selector = LabelSelector::from_labels(&labels(&[("tier", "frontend"), ("app", "web")]));
        assert_eq!(selector.to_string(), "app=web,tier=frontend");
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector = LabelSelector::everything();
        assert!(selector.is_empty());
        assert_eq!(selector.to_string(), "");
        assert!(selector.matches(&labels(&[])));
        assert!(selector.matches(&labels(&[("app", "anything")])));
    }

    #[test]
    fn test_selector_requires_all_pairs() {
        let selector = LabelSelector::from_labels(&labels(&[("app", "web"), ("tier", "frontend")]));

        assert!(selector.matches(&labels(&[
            ("app", "web"),
            ("tier", "frontend"),
            ("extra", "ignored"),
        ])));
        assert!(!selector.matches(&labels(&[("app", "web")])));
        assert!(!selector.matches(&labels(&[("app", "web"), ("tier", "backend")])));
    }
}
