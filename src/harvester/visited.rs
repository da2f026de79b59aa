//! In-memory visited-key set
//!
//! Scoped to one harvester run: seeded from the persistence layer at
//! construction, grows monotonically, and is emptied only by `reset`.

use std::collections::HashSet;

/// Set of canonical URLs already processed
#[derive(Debug, Default)]
pub struct VisitedSet {
    keys: HashSet<String>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set seeded with the given keys
    pub fn seeded(keys: HashSet<String>) -> Self {
        Self { keys }
    }

    /// Membership check
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Marks a key as visited; returns false if it was already present
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    /// Empties the set; the only removal path mid-run
    pub fn reset(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut visited = VisitedSet::new();
        assert!(!visited.contains("https://example.com/a"));
        assert!(visited.insert("https://example.com/a"));
        assert!(visited.contains("https://example.com/a"));
        // Second insert of the same key reports no change
        assert!(!visited.insert("https://example.com/a"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_seeded_from_existing_keys() {
        let mut keys = HashSet::new();
        keys.insert("https://example.com/old".to_string());
        let visited = VisitedSet::seeded(keys);

        assert!(visited.contains("https://example.com/old"));
        assert!(!visited.contains("https://example.com/new"));
    }

    #[test]
    fn test_reset_empties() {
        let mut visited = VisitedSet::new();
        visited.insert("https://example.com/a");
        visited.insert("https://example.com/b");
        visited.reset();

        assert!(visited.is_empty());
        assert!(!visited.contains("https://example.com/a"));
    }
}
