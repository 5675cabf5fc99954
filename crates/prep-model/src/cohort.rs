//! The cohort registry: patient identifiers that survived demographic cleaning.

use std::collections::HashSet;

/// Ordered, de-duplicated set of patient identifiers.
///
/// Identifiers are kept in first-seen order; membership tests are O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortRegistry {
    ids: Vec<String>,
    index: HashSet<String>,
}

impl CohortRegistry {
    /// Build a registry, dropping repeated identifiers after their first occurrence.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::default();
        for id in ids {
            let id = id.into();
            if registry.index.insert(id.clone()) {
                registry.ids.push(id);
            }
        }
        registry
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_seen_order_without_repeats() {
        let registry = CohortRegistry::from_ids(["P2", "P1", "P2", "P3"]);
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec!["P2", "P1", "P3"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("P1"));
        assert!(!registry.contains("P4"));
    }

    #[test]
    fn empty_registry() {
        let registry = CohortRegistry::from_ids(Vec::<String>::new());
        assert!(registry.is_empty());
        assert!(!registry.contains(""));
    }
}
