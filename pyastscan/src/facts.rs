//! Shared fact store populated by previsitors.
//!
//! Facts aggregate data across the whole corpus (e.g. every identifier
//! referenced anywhere). The store is written only during the previsit
//! phase; the match phase holds a shared borrow, so late writes are ruled
//! out at compile time.

use rustc_hash::{FxHashMap, FxHashSet};

/// Process-wide fact mapping: fact key to an aggregated set of strings.
#[derive(Debug, Default)]
pub struct FactStore {
    entries: FxHashMap<&'static str, FxHashSet<String>>,
}

impl FactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure a fact key exists, so readers can distinguish "no
    /// previsitor registered" from "previsitor found nothing".
    pub fn ensure(&mut self, key: &'static str) {
        self.entries.entry(key).or_default();
    }

    /// Adds one value to a fact's aggregated set.
    pub fn insert(&mut self, key: &'static str, value: String) {
        self.entries.entry(key).or_default().insert(value);
    }

    /// Returns a fact's aggregated set, or `None` when no previsitor
    /// registered the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FxHashSet<String>> {
        self.entries.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_registers_empty_sets() {
        let mut facts = FactStore::new();
        assert!(facts.get("names").is_none());
        facts.ensure("names");
        assert!(facts.get("names").is_some_and(|set| set.is_empty()));

        facts.insert("names", "Foo".to_owned());
        assert!(facts.get("names").is_some_and(|set| set.contains("Foo")));
    }
}
