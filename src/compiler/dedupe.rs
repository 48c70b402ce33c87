//! Duplicate removal for discovered file lists.

use std::{
    collections::{BTreeSet, HashSet},
    hash::Hash,
};

/// How an asset class removes duplicate files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    /// Keep the first occurrence of each item, in discovery order.
    ///
    /// Required where concatenation order is load order (scripts).
    FirstSeen,
    /// Collapse into a sorted set; discovery order is not kept.
    Sorted,
}

impl Uniqueness {
    /// Apply this strategy to a sequence.
    pub fn apply<T, I>(self, items: I) -> Vec<T>
    where
        T: Eq + Hash + Ord + Clone,
        I: IntoIterator<Item = T>,
    {
        match self {
            Self::FirstSeen => dedupe(items),
            Self::Sorted => items
                .into_iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }
}

/// Remove duplicates, keeping each item at the position it first appeared.
pub fn dedupe<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
