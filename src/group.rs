//! Insertion-ordered accumulator keyed by group name.

use std::collections::HashMap;

/// Name of the bucket used when a row carries no usable grouping value.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Accumulators keyed by GroupKey, remembering the order keys were first seen.
///
/// Aggregators fold rows into a fresh table per call; iteration yields
/// entries in first-encounter order.
#[derive(Debug, Clone)]
pub struct GroupTable<T> {
    index: HashMap<String, usize>,
    entries: Vec<T>,
}

impl<T> Default for GroupTable<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<T> GroupTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the accumulator for `key`, creating it with `init` on first sight.
    pub fn entry_or_insert_with<F>(&mut self, key: &str, init: F) -> &mut T
    where
        F: FnOnce(&str) -> T,
    {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.entries.push(init(key));
                let slot = self.entries.len() - 1;
                self.index.insert(key.to_string(), slot);
                slot
            }
        };
        &mut self.entries[slot]
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-encounter order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.entries
    }
}

impl<T> IntoIterator for GroupTable<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a GroupTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Share of `part` in `total` as a percentage, flooring a zero total to 1.
///
/// A zero total therefore gives `0.0` rather than `NaN`.
pub fn pct(part: f64, total: f64) -> f64 {
    let denominator = if total == 0.0 { 1.0 } else { total };
    (part / denominator) * 100.0
}
