use std::collections::BTreeSet;
use std::path::Path;

use crate::core::normalize_uri;
use crate::error::Result;
use crate::parsing::read_list_file;

/// Predicates whose values are made searchable, stored without angle brackets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedPredicates {
    predicates: BTreeSet<String>,
}

impl IndexedPredicates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one predicate per line. Blank lines and `#` comments are ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(read_list_file(path)?.iter().map(String::as_str).collect())
    }

    pub fn insert(&mut self, predicate: &str) {
        self.predicates.insert(normalize_uri(predicate.trim()).to_string());
    }

    pub fn contains(&self, predicate: &str) -> bool {
        self.predicates.contains(predicate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.predicates.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for IndexedPredicates {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut predicates = Self::new();
        for predicate in iter {
            predicates.insert(predicate);
        }
        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brackets_are_stripped() {
        let predicates: IndexedPredicates = ["<rs_label>", "r_type", " f_type.object.name "].into_iter().collect();
        assert!(predicates.contains("rs_label"));
        assert!(predicates.contains("f_type.object.name"));
        assert!(!predicates.contains("<rs_label>"));
        assert_eq!(predicates.iter().collect::<Vec<_>>(), vec!["f_type.object.name", "r_type", "rs_label"]);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predicates.txt");
        std::fs::write(&path, "# indexed\nrs_label\n\n<r_type>\n").unwrap();
        let predicates = IndexedPredicates::from_file(&path).unwrap();
        assert_eq!(predicates.len(), 2);
        assert!(predicates.contains("r_type"));
    }
}
