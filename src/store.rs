use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::pattern::Pattern;
use crate::tuple::Tuple;

/// Multiset of tuples, unsynchronized.
///
/// Tuples are bucketed by arity; each bucket maps a tuple to its
/// multiplicity, so duplicates share one entry and are visited once. A scan
/// walks the bucket of the pattern's arity in ascending tuple order.
#[derive(Debug, Default)]
pub(crate) struct Store {
    buckets: BTreeMap<usize, BTreeMap<Tuple, usize>>,
    len: usize,
}

impl Store {
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn insert(&mut self, tuple: Tuple) {
        *self
            .buckets
            .entry(tuple.len())
            .or_default()
            .entry(tuple)
            .or_insert(0) += 1;
        self.len += 1;
    }

    /// First stored tuple matching `pattern`, removing one instance of it
    /// when `remove` is set.
    pub(crate) fn find(&mut self, pattern: &Pattern, remove: bool) -> Option<Tuple> {
        let arity = pattern.len();
        let bucket = self.buckets.get_mut(&arity)?;

        let found = match pattern.as_literal() {
            Some(tuple) => bucket.get_key_value(&tuple).map(|(stored, _)| stored.clone()),
            None => bucket.keys().find(|tuple| pattern.matches(tuple)).cloned(),
        }?;

        if remove {
            if let Entry::Occupied(mut entry) = bucket.entry(found.clone()) {
                *entry.get_mut() -= 1;
                if *entry.get() == 0 {
                    entry.remove();
                }
            }
            if bucket.is_empty() {
                self.buckets.remove(&arity);
            }
            self.len -= 1;
        }
        Some(found)
    }

    pub(crate) fn count(&self, pattern: &Pattern) -> usize {
        self.buckets
            .get(&pattern.len())
            .map(|bucket| {
                bucket
                    .iter()
                    .filter(|(tuple, _)| pattern.matches(tuple))
                    .map(|(_, copies)| *copies)
                    .sum::<usize>()
            })
            .unwrap_or(0)
    }

    /// Every stored tuple, duplicates repeated, in scan order.
    pub(crate) fn snapshot(&self) -> Vec<Tuple> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.iter())
            .flat_map(|(tuple, copies)| std::iter::repeat(tuple.clone()).take(*copies))
            .collect()
    }
}
