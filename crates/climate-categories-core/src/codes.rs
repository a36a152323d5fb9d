//! Code Store
//!
//! Immutable mapping from category code to meaning. Codes keep the order in
//! which they were supplied at construction.

use std::collections::HashMap;

use crate::error::{CategorizationError, Result};

/// Immutable code → meaning store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeStore {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl CodeStore {
    /// Build a store from `(code, meaning)` pairs.
    ///
    /// Fails with `DuplicateCode` if a code is supplied twice.
    pub fn new<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut store = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for (code, meaning) in pairs {
            store.push(code.into(), meaning.into())?;
        }
        Ok(store)
    }

    fn push(&mut self, code: String, meaning: String) -> Result<()> {
        if self.index.contains_key(&code) {
            return Err(CategorizationError::DuplicateCode { code });
        }
        self.index.insert(code.clone(), self.entries.len());
        self.entries.push((code, meaning));
        Ok(())
    }

    /// New store holding these codes followed by `additions`.
    ///
    /// Every added code must be new, both with respect to this store and
    /// within `additions` itself.
    pub(crate) fn merged(&self, additions: &[(String, String)]) -> Result<Self> {
        let mut store = self.clone();
        for (code, meaning) in additions {
            store.push(code.clone(), meaning.clone())?;
        }
        Ok(store)
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.index
            .get(code)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Meaning of `code`, or `CodeNotFound`
    pub fn lookup(&self, code: &str) -> Result<&str> {
        self.get(code)
            .ok_or_else(|| CategorizationError::not_found(code))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All codes in insertion order. Each call starts a fresh iteration.
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            inner: self.entries.iter(),
        }
    }

    /// All `(code, meaning)` pairs in insertion order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(code, meaning)| (code.as_str(), meaning.as_str()))
    }
}

/// Iterator over the codes of a [`CodeStore`]
#[derive(Debug, Clone)]
pub struct Keys<'a> {
    inner: std::slice::Iter<'a, (String, String)>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(code, _)| code.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Keys<'_> {}

impl DoubleEndedIterator for Keys<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(code, _)| code.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CodeStore {
        CodeStore::new([("1", "Energy"), ("1.A", "Fuel Combustion"), ("2", "IPPU")]).unwrap()
    }

    #[test]
    fn test_lookup_known_and_unknown() {
        let store = sample();
        assert_eq!(store.lookup("1.A").unwrap(), "Fuel Combustion");
        assert!(matches!(
            store.lookup("9"),
            Err(CategorizationError::CodeNotFound { code }) if code == "9"
        ));
        assert!(store.get("9").is_none());
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let store = sample();
        let keys: Vec<_> = store.keys().collect();
        assert_eq!(keys, vec!["1", "1.A", "2"]);
        // restartable
        assert_eq!(store.keys().count(), 3);
        assert_eq!(store.keys().len(), 3);
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = CodeStore::new([("1", "a"), ("1", "b")]);
        assert!(matches!(
            result,
            Err(CategorizationError::DuplicateCode { code }) if code == "1"
        ));
    }

    #[test]
    fn test_merged_leaves_original_untouched() {
        let store = sample();
        let merged = store
            .merged(&[("3".to_string(), "Agriculture".to_string())])
            .unwrap();
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.keys().last(), Some("3"));
        assert_eq!(store.len(), 3);
        assert!(!store.contains("3"));
    }

    #[test]
    fn test_merged_rejects_existing_and_repeated_codes() {
        let store = sample();
        assert!(store
            .merged(&[("1.A".to_string(), "x".to_string())])
            .is_err());
        assert!(store
            .merged(&[
                ("4".to_string(), "x".to_string()),
                ("4".to_string(), "y".to_string()),
            ])
            .is_err());
    }
}
