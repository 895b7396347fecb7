use std::{collections::HashSet, hash::Hash};

/// Keep the first occurrence of every key, preserving input order.
/// Returns the survivors and how many items were dropped.
pub fn dedup_by_key<T, K, F>(items: Vec<T>, mut key: F) -> (Vec<T>, usize)
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let before = items.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<T> = items.into_iter().filter(|item| seen.insert(key(item))).collect();
    let removed = before - kept.len();
    (kept, removed)
}
